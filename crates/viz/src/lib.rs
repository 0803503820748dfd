#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/stockcast/stockcast/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod config;
pub use config::ChartConfig;

mod render;

mod plots;
pub use plots::{
    plot_closing_price, plot_daily_returns, plot_returns_and_volatility, plot_returns_distribution,
};

mod error;
pub use error::VizError;
