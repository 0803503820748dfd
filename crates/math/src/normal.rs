//! Standard normal distribution helpers.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::MathError;

fn standard_normal() -> Result<Normal, MathError> {
    Normal::new(0.0, 1.0).map_err(|e| MathError::NumericalInstability(e.to_string()))
}

/// Inverse CDF (quantile function) of the standard normal distribution.
///
/// # Errors
/// Returns error if `p` is outside the open interval (0, 1).
pub fn norm_ppf(p: f64) -> Result<f64, MathError> {
    if p.is_nan() || p <= 0.0 || p >= 1.0 {
        return Err(MathError::InvalidProbability(p));
    }
    Ok(standard_normal()?.inverse_cdf(p))
}

/// CDF of the standard normal distribution.
///
/// # Errors
/// Returns error only if the distribution cannot be constructed.
pub fn norm_cdf(x: f64) -> Result<f64, MathError> {
    Ok(standard_normal()?.cdf(x))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.5, 0.0)]
    #[case(0.975, 1.959_963_984_540_054)]
    #[case(0.05, -1.644_853_626_951_472_2)]
    fn ppf_known_values(#[case] p: f64, #[case] expected: f64) {
        assert_relative_eq!(norm_ppf(p).unwrap(), expected, epsilon = 1e-8);
    }

    #[test]
    fn cdf_inverts_ppf() {
        let x = norm_ppf(0.3).unwrap();
        assert_relative_eq!(norm_cdf(x).unwrap(), 0.3, epsilon = 1e-10);
    }

    #[test]
    fn ppf_rejects_bounds() {
        assert!(norm_ppf(0.0).is_err());
        assert!(norm_ppf(1.0).is_err());
        assert!(norm_ppf(f64::NAN).is_err());
    }
}
