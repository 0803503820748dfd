#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockcast/stockcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::LoaderConfig;

mod csv;
pub use csv::{read_csv, save_to_csv};

mod loader;
pub use loader::load_stock_data;

mod missing;
pub use missing::{MissingCount, check_missing_data};

#[cfg(feature = "yahoo")]
mod yahoo;
#[cfg(feature = "yahoo")]
pub use yahoo::YahooSource;

mod error;
pub use error::DataError;
