//! Error types for the forecasting pipeline.

use stockcast_math::MathError;
use stockcast_stats::StatsError;
use stockcast_traits::EstimatorError;

/// Errors that can occur while splitting, fitting or forecasting.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Statistics error.
    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// The table index is not a strictly increasing `Date` column.
    #[error("invalid date index: {0}")]
    InvalidIndex(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Forecast index length differs from the horizon.
    #[error("forecast index has {actual} dates but the horizon is {expected} steps")]
    IndexLengthMismatch {
        /// Forecast horizon.
        expected: usize,
        /// Length of the supplied index.
        actual: usize,
    },

    /// No candidate order could be fitted.
    #[error("order search failed: {0}")]
    SearchFailed(String),
}

impl ModelError {
    /// Returns whether this error is a configuration mistake by the caller.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidIndex(_) | Self::InvalidConfig(_) | Self::IndexLengthMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::IndexLengthMismatch { expected: 30, actual: 29 };
        assert_eq!(err.to_string(), "forecast index has 29 dates but the horizon is 30 steps");
        assert!(err.is_config_error());
    }

    #[test]
    fn estimator_errors_convert() {
        let err: ModelError = EstimatorError::NonFinite.into();
        assert!(!err.is_config_error());
        assert!(err.to_string().contains("non-finite"));
    }
}
