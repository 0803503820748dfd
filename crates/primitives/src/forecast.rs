//! Forecast output in plain vectors.

use serde::{Deserialize, Serialize};

/// Point forecasts and confidence bounds for consecutive future steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPath {
    /// Point forecasts, one per step.
    pub mean: Vec<f64>,
    /// Lower confidence bound per step.
    pub lower: Vec<f64>,
    /// Upper confidence bound per step.
    pub upper: Vec<f64>,
    /// Two-sided tail probability of the interval.
    pub alpha: f64,
}

impl ForecastPath {
    /// Number of forecast steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// Whether the path holds no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Confidence level of the interval, e.g. 0.95.
    #[must_use]
    pub fn confidence(&self) -> f64 {
        1.0 - self.alpha
    }
}
