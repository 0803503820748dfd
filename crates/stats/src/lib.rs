#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockcast/stockcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod values;
pub use values::{column_options, column_values};

mod returns;
pub use returns::{DailyReturns, add_daily_returns};

mod rolling;
pub use rolling::{DEFAULT_WINDOWS, RollingStats, add_rolling_stats};

mod outliers;
pub use outliers::{
    DEFAULT_IQR_FACTOR, DEFAULT_Z_THRESHOLD, OutlierBounds, detect_outliers_iqr,
    detect_outliers_zscore, iqr_bounds,
};

mod risk;
pub use risk::{RiskConfig, RiskReport, VarMethod, compute_sharpe, compute_var, risk_report};

mod stationarity;
pub use stationarity::{
    AdfConfig, AdfResult, CriticalValues, KpssResult, adf_test, adf_test_with, kpss_test,
    mackinnon_p_value,
};

mod describe;
pub use describe::{ColumnSummary, DescriptiveStats, describe_values, descriptive_stats};

mod error;
pub use error::StatsError;
