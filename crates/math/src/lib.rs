#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockcast/stockcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod linalg;
pub use linalg::{OlsResult, invert, ols, solve_linear_system};

mod quantile;
pub use quantile::{quantile, quantile_sorted};

mod moments;
pub use moments::{autocovariance, excess_kurtosis, mean, skewness, std_dev, variance, zscores};

mod normal;
pub use normal::{norm_cdf, norm_ppf};

mod optimize;
pub use optimize::{Minimum, NelderMead, NelderMeadConfig};

mod diff;
pub use diff::{difference, seasonal_difference};

mod error;
pub use error::MathError;
