//! Empirical quantiles with linear interpolation.

use crate::MathError;

/// Quantile of `values` at probability `q` using linear interpolation.
///
/// The position of the quantile in the sorted sample is `(n - 1) * q`;
/// fractional positions interpolate between neighbours. NaN values are
/// ignored.
///
/// # Errors
/// Returns error if `q` is outside `[0, 1]` or no finite values remain.
pub fn quantile(values: &[f64], q: f64) -> Result<f64, MathError> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Same as [`quantile`] for data already sorted ascending and free of NaN.
///
/// # Errors
/// Returns error if `q` is outside `[0, 1]` or `sorted` is empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Result<f64, MathError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(MathError::InvalidProbability(q));
    }
    let n = sorted.len();
    if n == 0 {
        return Err(MathError::EmptyData);
    }

    let h = (n - 1) as f64 * q;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}
