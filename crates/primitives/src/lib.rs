#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockcast/stockcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod symbol;
pub use symbol::Symbol;

mod range;
pub use range::{DateRange, epoch_days, from_epoch_days};

mod order;
pub use order::{ArimaOrder, SeasonalOrder};

mod forecast;
pub use forecast::ForecastPath;

pub mod columns;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
