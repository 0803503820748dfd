//! Strength of seasonality from a classical additive decomposition.

use stockcast_math::{MathError, variance};

/// Seasonal strength `max(0, 1 - Var(R) / Var(S + R))` of `values`.
///
/// The trend is a centred moving average of length `period` (a 2×`period`
/// average when `period` is even), the seasonal component is the centred
/// mean of the detrended values at each position in the cycle and the
/// remainder is what is left. Values near 1 indicate a strong seasonal
/// pattern.
///
/// # Errors
/// Returns error if `period < 2` or fewer than two full periods are given.
pub fn seasonal_strength(values: &[f64], period: usize) -> Result<f64, MathError> {
    if period < 2 {
        return Err(MathError::InsufficientData { required: 2, actual: period });
    }
    let n = values.len();
    if n < 2 * period {
        return Err(MathError::InsufficientData { required: 2 * period, actual: n });
    }

    let half = period / 2;
    let mut detrended: Vec<(usize, f64)> = Vec::with_capacity(n - 2 * half);
    for t in half..n - half {
        let trend = if period % 2 == 0 {
            let inner: f64 = values[t + 1 - half..t + half].iter().sum();
            (inner + 0.5 * (values[t - half] + values[t + half])) / period as f64
        } else {
            values[t - half..=t + half].iter().sum::<f64>() / period as f64
        };
        detrended.push((t, values[t] - trend));
    }

    let mut sums = vec![0.0; period];
    let mut counts = vec![0usize; period];
    for &(t, x) in &detrended {
        sums[t % period] += x;
        counts[t % period] += 1;
    }
    let mut indices: Vec<f64> =
        sums.iter().zip(&counts).map(|(s, &c)| if c > 0 { s / c as f64 } else { 0.0 }).collect();
    let level = indices.iter().sum::<f64>() / period as f64;
    indices.iter_mut().for_each(|s| *s -= level);

    let seasonal_plus_remainder: Vec<f64> = detrended.iter().map(|&(_, x)| x).collect();
    let remainder: Vec<f64> =
        detrended.iter().map(|&(t, x)| x - indices[t % period]).collect();

    let total = variance(&seasonal_plus_remainder, 1)?;
    if total <= f64::EPSILON {
        return Ok(0.0);
    }
    Ok((1.0 - variance(&remainder, 1)? / total).max(0.0))
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(4)]
    #[case(5)]
    #[case(12)]
    fn periodic_series_is_strongly_seasonal(#[case] period: usize) {
        let values: Vec<f64> = (0..10 * period)
            .map(|t| 0.05 * t as f64 + ((t % period) as f64 - 1.0).powi(2))
            .collect();
        assert!(seasonal_strength(&values, period).unwrap() > 0.9);
    }

    #[test]
    fn noise_is_not_seasonal() {
        let mut rng = StdRng::seed_from_u64(21);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let values: Vec<f64> = (0..240).map(|_| normal.sample(&mut rng)).collect();
        assert!(seasonal_strength(&values, 12).unwrap() < 0.64);
    }

    #[test]
    fn constant_series_has_zero_strength() {
        assert_eq!(seasonal_strength(&[3.0; 24], 4).unwrap(), 0.0);
    }

    #[test]
    fn needs_two_periods() {
        assert!(seasonal_strength(&[1.0; 7], 4).is_err());
        assert!(seasonal_strength(&[1.0; 7], 1).is_err());
    }
}
