//! Sample moments.

use crate::MathError;

/// Arithmetic mean.
///
/// # Errors
/// Returns error if `values` is empty.
pub fn mean(values: &[f64]) -> Result<f64, MathError> {
    if values.is_empty() {
        return Err(MathError::EmptyData);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Variance with `ddof` delta degrees of freedom (1 for the sample variance).
///
/// # Errors
/// Returns error if fewer than `ddof + 1` values are given.
pub fn variance(values: &[f64], ddof: usize) -> Result<f64, MathError> {
    let n = values.len();
    if n <= ddof {
        return Err(MathError::InsufficientData { required: ddof + 1, actual: n });
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok(ss / (n - ddof) as f64)
}

/// Standard deviation with `ddof` delta degrees of freedom.
///
/// # Errors
/// Returns error if fewer than `ddof + 1` values are given.
pub fn std_dev(values: &[f64], ddof: usize) -> Result<f64, MathError> {
    variance(values, ddof).map(f64::sqrt)
}

/// Bias-corrected sample skewness (adjusted Fisher-Pearson coefficient).
///
/// Returns 0 for a constant sample.
///
/// # Errors
/// Returns error if fewer than three values are given.
pub fn skewness(values: &[f64]) -> Result<f64, MathError> {
    let n = values.len();
    if n < 3 {
        return Err(MathError::InsufficientData { required: 3, actual: n });
    }
    let m = mean(values)?;
    let nf = n as f64;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if is_degenerate(m2, m) {
        return Ok(0.0);
    }
    let g1 = m3 / m2.powf(1.5);
    Ok((nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1)
}

/// Bias-corrected excess kurtosis (zero for a normal distribution).
///
/// Returns 0 for a constant sample.
///
/// # Errors
/// Returns error if fewer than four values are given.
pub fn excess_kurtosis(values: &[f64]) -> Result<f64, MathError> {
    let n = values.len();
    if n < 4 {
        return Err(MathError::InsufficientData { required: 4, actual: n });
    }
    let m = mean(values)?;
    let nf = n as f64;
    let s2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    let s4 = values.iter().map(|v| (v - m).powi(4)).sum::<f64>();
    if is_degenerate(s2 / nf, m) {
        return Ok(0.0);
    }
    let adj = 3.0 * (nf - 1.0).powi(2) / ((nf - 2.0) * (nf - 3.0));
    let num = nf * (nf + 1.0) * (nf - 1.0) * s4;
    let den = (nf - 2.0) * (nf - 3.0) * s2 * s2;
    Ok(num / den - adj)
}

/// Second central moment indistinguishable from rounding noise around `mean`.
fn is_degenerate(m2: f64, mean: f64) -> bool {
    m2 <= 1e2 * (f64::EPSILON * mean.abs()).powi(2)
}

/// Population z-scores `(x - mean) / std` with `ddof = 0`.
///
/// A constant sample yields NaN scores.
///
/// # Errors
/// Returns error if `values` is empty.
pub fn zscores(values: &[f64]) -> Result<Vec<f64>, MathError> {
    let m = mean(values)?;
    let sd = std_dev(values, 0)?;
    Ok(values.iter().map(|v| (v - m) / sd).collect())
}

/// Sample autocovariance at `lag` around the sample mean, normalised by `n`.
///
/// # Errors
/// Returns error if `lag >= values.len()`.
pub fn autocovariance(values: &[f64], lag: usize) -> Result<f64, MathError> {
    let n = values.len();
    if lag >= n {
        return Err(MathError::InsufficientData { required: lag + 1, actual: n });
    }
    let m = mean(values)?;
    let sum: f64 = (lag..n).map(|t| (values[t] - m) * (values[t - lag] - m)).sum();
    Ok(sum / n as f64)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    const DATA: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn variance_and_std() {
        assert_relative_eq!(mean(&DATA).unwrap(), 5.0);
        assert_relative_eq!(variance(&DATA, 0).unwrap(), 4.0);
        assert_relative_eq!(std_dev(&DATA, 0).unwrap(), 2.0);
        assert_relative_eq!(variance(&DATA, 1).unwrap(), 32.0 / 7.0);
    }

    #[test]
    fn skewness_matches_adjusted_estimator() {
        // m2 = 4, m3 = 42/8 = 5.25, g1 = 5.25 / 8
        let expected = (8.0_f64 * 7.0).sqrt() / 6.0 * (5.25 / 8.0);
        assert_relative_eq!(skewness(&DATA).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn kurtosis_matches_adjusted_estimator() {
        // sum of squared deviations 32, fourth powers 356
        let n = 8.0_f64;
        let expected = n * (n + 1.0) * (n - 1.0) * 356.0 / ((n - 2.0) * (n - 3.0) * 32.0 * 32.0)
            - 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
        assert_relative_eq!(excess_kurtosis(&DATA).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn symmetric_sample_has_zero_skew() {
        assert_relative_eq!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn zscores_are_standardised() {
        let z = zscores(&DATA).unwrap();
        assert_relative_eq!(z[0], -1.5);
        assert_relative_eq!(z[7], 2.0);
    }

    #[test]
    fn autocovariance_lag_zero_is_population_variance() {
        assert_relative_eq!(autocovariance(&DATA, 0).unwrap(), 4.0);
        assert!(autocovariance(&DATA, 8).is_err());
    }

    #[test]
    fn short_samples_are_rejected() {
        assert!(variance(&[1.0], 1).is_err());
        assert!(skewness(&[1.0, 2.0]).is_err());
        assert!(excess_kurtosis(&[1.0, 2.0, 3.0]).is_err());
    }
}
