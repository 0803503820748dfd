//! Outlier detection on a return column.
//!
//! Both policies compute their thresholds from the non-null values but build
//! the selection mask over the original rows, so the returned frame holds the
//! flagged rows exactly as they appear in the input.

use polars::prelude::*;
use stockcast_math::{mean, quantile, std_dev};
use tracing::debug;

use crate::{StatsError, column_options};

/// Default IQR multiplier.
pub const DEFAULT_IQR_FACTOR: f64 = 1.5;

/// Default absolute z-score threshold.
pub const DEFAULT_Z_THRESHOLD: f64 = 3.0;

/// Acceptance interval outside of which values are outliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutlierBounds {
    /// Lower fence.
    pub lower: f64,
    /// Upper fence.
    pub upper: f64,
}

impl OutlierBounds {
    /// Whether `value` lies strictly outside the fences.
    #[must_use]
    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Tukey fences `[Q1 - factor * IQR, Q3 + factor * IQR]` of `values`.
///
/// # Errors
/// Returns error if `factor` is negative or `values` holds no finite value.
pub fn iqr_bounds(values: &[f64], factor: f64) -> Result<OutlierBounds, StatsError> {
    if factor.is_nan() || factor < 0.0 {
        return Err(StatsError::InvalidConfig(format!("IQR factor must be non-negative, got {factor}")));
    }
    let q1 = quantile(values, 0.25)?;
    let q3 = quantile(values, 0.75)?;
    let iqr = q3 - q1;
    Ok(OutlierBounds { lower: q1 - factor * iqr, upper: q3 + factor * iqr })
}

/// Rows whose `column` value falls outside the IQR fences.
///
/// # Arguments
/// * `df` - Input table
/// * `column` - Column to screen, typically `daily_return`
/// * `factor` - IQR multiplier, 1.5 for Tukey's fences
///
/// # Errors
/// Returns error if the column is missing, has no non-null values, or
/// `factor` is negative.
pub fn detect_outliers_iqr(
    df: &DataFrame,
    column: &str,
    factor: f64,
) -> Result<DataFrame, StatsError> {
    let options = column_options(df, column)?;
    let valid: Vec<f64> = options.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    let bounds = iqr_bounds(&valid, factor)?;

    let mask: Vec<bool> =
        options.iter().map(|v| v.is_some_and(|x| x.is_finite() && bounds.is_outlier(x))).collect();
    select_rows(df, column, &mask, "iqr")
}

/// Rows whose `column` value has a population z-score above `threshold` in
/// absolute value.
///
/// A constant column has no outliers.
///
/// # Errors
/// Returns error if the column is missing, has no non-null values, or
/// `threshold` is not positive.
pub fn detect_outliers_zscore(
    df: &DataFrame,
    column: &str,
    threshold: f64,
) -> Result<DataFrame, StatsError> {
    if threshold.is_nan() || threshold <= 0.0 {
        return Err(StatsError::InvalidConfig(format!(
            "z-score threshold must be positive, got {threshold}"
        )));
    }
    let options = column_options(df, column)?;
    let valid: Vec<f64> = options.iter().flatten().copied().filter(|v| v.is_finite()).collect();
    let mu = mean(&valid)?;
    let sigma = std_dev(&valid, 0)?;

    let mask: Vec<bool> = options
        .iter()
        .map(|v| {
            v.is_some_and(|x| x.is_finite() && sigma > 0.0 && ((x - mu) / sigma).abs() > threshold)
        })
        .collect();
    select_rows(df, column, &mask, "zscore")
}

fn select_rows(
    df: &DataFrame,
    column: &str,
    mask: &[bool],
    policy: &str,
) -> Result<DataFrame, StatsError> {
    let mask = BooleanChunked::from_slice("outlier".into(), mask);
    let out = df.filter(&mask)?;
    debug!(policy, column, flagged = out.height(), rows = df.height(), "outlier screen");
    Ok(out)
}
