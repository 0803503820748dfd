//! # stockcast
//!
//! Stock price analysis and forecasting.
//!
//! This crate provides a unified interface to the stockcast workspace.
//! Individual components can be enabled via feature flags.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Symbols, date ranges, model orders and column names
//! - `traits`: Data source, table transform and estimator abstractions
//! - `math`: Numerical kernels
//! - `stats`: Returns, rolling statistics, outliers, risk and stationarity
//! - `model`: Train/test split, SARIMA search and forecasting
//! - `data`: Yahoo Finance download and CSV persistence
//! - `viz`: SVG charts
//! - `cli`: The `analyze` binary
//!
//! ## Example
//!
//! ```rust
//! use stockcast::stats::{RiskConfig, risk_report};
//!
//! let returns = [-0.05, -0.01, 0.0, 0.02, 0.05];
//! let report = risk_report(&returns, &RiskConfig::default())?;
//! assert!((report.historical_var - 0.042).abs() < 1e-12);
//! # Ok::<(), stockcast::stats::StatsError>(())
//! ```
//!
//! With specific features only:
//!
//! ```toml
//! [dependencies]
//! stockcast = { version = "0.1", default-features = false, features = ["model"] }
//! ```

#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use stockcast_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use stockcast_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use stockcast_math as math;
#[cfg(feature = "stats")]
#[doc(inline)]
pub use stockcast_stats as stats;
#[cfg(feature = "model")]
#[doc(inline)]
pub use stockcast_model as model;
#[cfg(feature = "data")]
#[doc(inline)]
pub use stockcast_data as data;
#[cfg(feature = "viz")]
#[doc(inline)]
pub use stockcast_viz as viz;
