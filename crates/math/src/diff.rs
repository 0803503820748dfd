//! Differencing operators.

/// Apply the first-difference operator `d` times.
///
/// Each pass shortens the series by one observation.
#[must_use]
pub fn difference(values: &[f64], d: usize) -> Vec<f64> {
    seasonal_difference(values, 1, d)
}

/// Apply the lag-`period` difference `(1 - B^period)` `d` times.
///
/// Each pass shortens the series by `period` observations; a series shorter
/// than the lag becomes empty.
#[must_use]
pub fn seasonal_difference(values: &[f64], period: usize, d: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    if period == 0 {
        return out;
    }
    for _ in 0..d {
        if out.len() <= period {
            return Vec::new();
        }
        out = (period..out.len()).map(|t| out[t] - out[t - period]).collect();
    }
    out
}
