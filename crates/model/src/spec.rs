//! SARIMA model specification and coefficients.

use std::fmt;

use serde::{Deserialize, Serialize};
use stockcast_primitives::{ArimaOrder, SeasonalOrder};
use stockcast_traits::EstimatorError;

use crate::polynomial::{differencing, expand_ar, expand_ma};

/// Orders of a SARIMA(p,d,q)(P,D,Q)[s] model and whether it carries a
/// constant.
///
/// The constant is the mean of the differenced series: a level mean when
/// `d + D = 0`, a drift otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SarimaSpec {
    /// Non-seasonal order.
    pub order: ArimaOrder,
    /// Seasonal order; ignored unless [`SeasonalOrder::is_seasonal`].
    pub seasonal: SeasonalOrder,
    /// Whether the differenced series has a non-zero mean.
    pub include_constant: bool,
}

impl Default for SarimaSpec {
    fn default() -> Self {
        Self::non_seasonal(ArimaOrder::default(), true)
    }
}

impl SarimaSpec {
    /// Create a specification.
    #[must_use]
    pub const fn new(order: ArimaOrder, seasonal: SeasonalOrder, include_constant: bool) -> Self {
        Self { order, seasonal, include_constant }
    }

    /// Create a specification without seasonal terms.
    #[must_use]
    pub const fn non_seasonal(order: ArimaOrder, include_constant: bool) -> Self {
        Self::new(order, SeasonalOrder::none(), include_constant)
    }

    /// The seasonal order actually in effect.
    #[must_use]
    pub const fn effective_seasonal(&self) -> SeasonalOrder {
        if self.seasonal.is_seasonal() { self.seasonal } else { SeasonalOrder::none() }
    }

    /// Number of estimated coefficients, excluding the innovation variance.
    #[must_use]
    pub const fn n_params(&self) -> usize {
        let s = self.effective_seasonal();
        self.include_constant as usize + self.order.p + self.order.q + s.p + s.q
    }

    /// Observations lost to differencing.
    #[must_use]
    pub const fn differencing_loss(&self) -> usize {
        let s = self.effective_seasonal();
        self.order.d + s.d * s.period
    }

    /// Smallest training length this specification can be fitted on.
    #[must_use]
    pub const fn min_observations(&self) -> usize {
        self.differencing_loss() + self.n_params() + 3
    }

    /// Coefficients of `(1 - B)^d (1 - B^s)^D`.
    pub(crate) fn differencing_polynomial(&self) -> Vec<f64> {
        let s = self.effective_seasonal();
        differencing(self.order.d, s.d, s.period)
    }

    /// Check that the orders describe a model that can be estimated.
    ///
    /// # Errors
    /// Returns `EstimatorError::InvalidConfig` if seasonal terms are
    /// requested with a period below 2.
    pub fn validate(&self) -> Result<(), EstimatorError> {
        let s = self.seasonal;
        if (s.p > 0 || s.d > 0 || s.q > 0) && s.period < 2 {
            return Err(EstimatorError::InvalidConfig(format!(
                "seasonal terms {s:?} need a period of at least 2"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SarimaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.order, self.effective_seasonal())?;
        if self.include_constant {
            write!(f, " with constant")?;
        }
        Ok(())
    }
}

/// Estimated SARIMA coefficients.
///
/// AR coefficients enter as `1 - Σ φ_i B^i`, MA coefficients as
/// `1 + Σ θ_i B^i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SarimaParams {
    /// Mean of the differenced series, when estimated.
    pub constant: Option<f64>,
    /// Non-seasonal AR coefficients.
    pub ar: Vec<f64>,
    /// Seasonal AR coefficients.
    pub seasonal_ar: Vec<f64>,
    /// Non-seasonal MA coefficients.
    pub ma: Vec<f64>,
    /// Seasonal MA coefficients.
    pub seasonal_ma: Vec<f64>,
}

impl SarimaParams {
    /// AR coefficients of the multiplied-out polynomial `φ(B) Φ(B^s)`.
    #[must_use]
    pub fn expanded_ar(&self, period: usize) -> Vec<f64> {
        expand_ar(&self.ar, &self.seasonal_ar, period)
    }

    /// MA coefficients of the multiplied-out polynomial `θ(B) Θ(B^s)`.
    #[must_use]
    pub fn expanded_ma(&self, period: usize) -> Vec<f64> {
        expand_ma(&self.ma, &self.seasonal_ma, period)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(SarimaSpec::non_seasonal(ArimaOrder::new(1, 1, 1), false), 2, 1)]
    #[case(SarimaSpec::non_seasonal(ArimaOrder::new(2, 0, 2), true), 5, 0)]
    #[case(SarimaSpec::new(ArimaOrder::new(1, 1, 0), SeasonalOrder::new(1, 1, 1, 12), false), 3, 13)]
    #[case(SarimaSpec::new(ArimaOrder::new(0, 0, 1), SeasonalOrder::new(2, 0, 0, 1), true), 2, 0)]
    fn parameter_counts(#[case] spec: SarimaSpec, #[case] n_params: usize, #[case] loss: usize) {
        assert_eq!(spec.n_params(), n_params);
        assert_eq!(spec.differencing_loss(), loss);
    }

    #[test]
    fn display_includes_seasonal_part() {
        let spec = SarimaSpec::new(ArimaOrder::new(0, 1, 1), SeasonalOrder::new(0, 1, 1, 12), false);
        assert_eq!(spec.to_string(), "ARIMA(0,1,1)(0,1,1)[12]");
        let spec = SarimaSpec::non_seasonal(ArimaOrder::new(1, 0, 0), true);
        assert_eq!(spec.to_string(), "ARIMA(1,0,0) with constant");
    }

    #[test]
    fn seasonal_terms_need_a_period() {
        let spec = SarimaSpec::new(ArimaOrder::new(1, 0, 0), SeasonalOrder::new(1, 0, 0, 0), false);
        assert!(spec.validate().is_err());
        assert!(SarimaSpec::default().validate().is_ok());
    }

    #[test]
    fn expanded_coefficients() {
        let params = SarimaParams { ar: vec![0.5], seasonal_ar: vec![0.2], ..Default::default() };
        let a = params.expanded_ar(2);
        assert_eq!(a.len(), 3);
        assert!((a[2] + 0.1).abs() < 1e-12);
    }
}
