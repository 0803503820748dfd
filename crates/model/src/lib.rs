#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockcast/stockcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod split;
pub use split::{TrainTestSplit, date_index, split_time_series};

mod polynomial;

mod spec;
pub use spec::{SarimaParams, SarimaSpec};

mod kalman;

mod fit;
pub use fit::{InformationCriterion, SarimaConfig, SarimaEstimator, SarimaFit};

mod seasonal;
pub use seasonal::seasonal_strength;

mod search;
pub use search::{
    AutoArima, AutoArimaConfig, AutoArimaResult, CandidateFit, ndiffs, nsdiffs, train_auto_arima,
};

mod forecast;
pub use forecast::{ForecastAccuracy, business_days_after, forecast_accuracy, generate_forecast};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use stockcast_traits::{Forecaster, ModelEstimator};

    pub use super::{
        AutoArima, AutoArimaConfig, ModelError, SarimaEstimator, SarimaFit, generate_forecast,
        split_time_series, train_auto_arima,
    };
}
