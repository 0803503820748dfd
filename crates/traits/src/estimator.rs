//! Time-series model estimation trait definitions.

use stockcast_primitives::ForecastPath;

/// Errors that can occur during model estimation or forecasting.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Insufficient data for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The optimiser or filter produced a non-finite likelihood.
    #[error("numerical failure: {0}")]
    Numerical(String),

    /// The input series contained NaN or infinite values.
    #[error("series contains non-finite values")]
    NonFinite,
}

impl EstimatorError {
    /// Returns whether this error is recoverable.
    ///
    /// Recoverable failures only rule out one candidate model; a search may
    /// move on to the next.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::Numerical(_))
    }
}

/// A fitted model able to extrapolate its training series.
pub trait Forecaster: Send + Sync {
    /// Forecast `steps` observations past the end of the training data.
    ///
    /// # Arguments
    /// * `steps` - Number of future observations
    /// * `alpha` - Two-sided tail probability; 0.05 yields a 95% interval
    ///
    /// # Errors
    /// Returns `EstimatorError` if `alpha` is outside (0, 1) or the model
    /// state is unusable.
    fn forecast(&self, steps: usize, alpha: f64) -> Result<ForecastPath, EstimatorError>;

    /// Number of observations the model was fitted on.
    fn n_obs(&self) -> usize;
}

/// Trait for estimating a time-series model from a univariate series.
pub trait ModelEstimator: Send + Sync {
    /// Configuration type for this estimator.
    type Config: Default + Clone + Send + Sync;

    /// Fitted model type.
    type Fitted: Forecaster;

    /// Create a new estimator with the given configuration.
    fn with_config(config: Self::Config) -> Self;

    /// Fit the model to `series`, ordered oldest first.
    ///
    /// # Errors
    /// Returns `EstimatorError` if the series is too short, contains
    /// non-finite values, or the likelihood cannot be evaluated.
    fn fit(&self, series: &[f64]) -> Result<Self::Fitted, EstimatorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_error_is_recoverable() {
        let err = EstimatorError::InsufficientData { required: 10, actual: 5 };
        assert!(err.is_recoverable());

        let err = EstimatorError::InvalidConfig("period".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn estimator_error_display() {
        let err = EstimatorError::InsufficientData { required: 30, actual: 12 };
        assert_eq!(err.to_string(), "insufficient data: need at least 30 observations, got 12");
    }
}
