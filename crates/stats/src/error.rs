//! Error types for statistics and derived features.

use stockcast_math::MathError;
use stockcast_traits::TransformError;

/// Errors that can occur while computing statistics.
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// Table transformation error.
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Math operation error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// VaR method name not recognised.
    #[error("unknown VaR method: {0} (expected historical, parametric or monte_carlo)")]
    UnknownVarMethod(String),

    /// Not enough non-null observations.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },
}

impl StatsError {
    /// Returns whether this error is a configuration mistake by the caller.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::InvalidConfig(_) | Self::UnknownVarMethod(_))
    }
}
