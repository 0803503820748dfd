//! Descriptive statistics of prices and returns.

use std::fmt;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use stockcast_math::{excess_kurtosis, mean, quantile_sorted, skewness, std_dev};

use crate::{StatsError, column_values};

/// Count, moments and quartiles of one column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    /// Number of finite values.
    pub count: usize,
    /// Mean.
    pub mean: f64,
    /// Sample standard deviation (NaN with fewer than two values).
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// First quartile.
    pub q25: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q75: f64,
    /// Maximum.
    pub max: f64,
}

/// Summary of a price column and its returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptiveStats {
    /// Price column name.
    pub price_column: String,
    /// Return column name.
    pub return_column: String,
    /// Price summary.
    pub price: ColumnSummary,
    /// Return summary.
    pub returns: ColumnSummary,
    /// Bias-corrected skewness of returns (NaN with fewer than three values).
    pub return_skewness: f64,
    /// Bias-corrected excess kurtosis of returns (NaN with fewer than four values).
    pub return_kurtosis: f64,
}

/// Summarise the finite entries of `values`.
///
/// # Errors
/// Returns error if `values` has no finite entries.
pub fn describe_values(values: &[f64]) -> Result<ColumnSummary, StatsError> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    let count = sorted.len();
    if count == 0 {
        return Err(StatsError::InsufficientData { required: 1, actual: 0 });
    }
    Ok(ColumnSummary {
        count,
        mean: mean(&sorted)?,
        std: std_dev(&sorted, 1).unwrap_or(f64::NAN),
        min: sorted[0],
        q25: quantile_sorted(&sorted, 0.25)?,
        median: quantile_sorted(&sorted, 0.5)?,
        q75: quantile_sorted(&sorted, 0.75)?,
        max: sorted[count - 1],
    })
}

/// Describe `price_column` and `return_column` of `df`.
///
/// # Errors
/// Returns error if either column is missing or has no finite values.
pub fn descriptive_stats(
    df: &DataFrame,
    price_column: &str,
    return_column: &str,
) -> Result<DescriptiveStats, StatsError> {
    let prices = column_values(df, price_column)?;
    let returns = column_values(df, return_column)?;

    Ok(DescriptiveStats {
        price_column: price_column.to_string(),
        return_column: return_column.to_string(),
        price: describe_values(&prices)?,
        returns: describe_values(&returns)?,
        return_skewness: skewness(&returns).unwrap_or(f64::NAN),
        return_kurtosis: excess_kurtosis(&returns).unwrap_or(f64::NAN),
    })
}

impl fmt::Display for DescriptiveStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<8} {:>14} {:>14}", "", self.price_column, self.return_column)?;
        let rows: [(&str, f64, f64); 8] = [
            ("count", self.price.count as f64, self.returns.count as f64),
            ("mean", self.price.mean, self.returns.mean),
            ("std", self.price.std, self.returns.std),
            ("min", self.price.min, self.returns.min),
            ("25%", self.price.q25, self.returns.q25),
            ("50%", self.price.median, self.returns.median),
            ("75%", self.price.q75, self.returns.q75),
            ("max", self.price.max, self.returns.max),
        ];
        for (label, p, r) in rows {
            writeln!(f, "{label:<8} {p:>14.4} {r:>14.6}")?;
        }
        writeln!(f, "skewness of returns:        {:.4}", self.return_skewness)?;
        write!(f, "excess kurtosis of returns: {:.4}", self.return_kurtosis)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use polars::prelude::*;

    use super::*;

    #[test]
    fn summary_matches_hand_computation() {
        let s = describe_values(&[4.0, 1.0, 3.0, 2.0, f64::NAN]).unwrap();
        assert_eq!(s.count, 4);
        assert_relative_eq!(s.mean, 2.5);
        assert_relative_eq!(s.std, (5.0f64 / 3.0).sqrt());
        assert_relative_eq!(s.q25, 1.75);
        assert_relative_eq!(s.median, 2.5);
        assert_relative_eq!(s.q75, 3.25);
        assert_eq!((s.min, s.max), (1.0, 4.0));
    }

    #[test]
    fn stats_of_price_table() {
        let df = df! {
            "Close" => [100.0, 101.0, 99.0, 102.0, 103.0, 101.5],
            "daily_return" => [None, Some(0.01), Some(-0.0198), Some(0.0303), Some(0.0098), Some(-0.0146)],
        }
        .unwrap();
        let stats = descriptive_stats(&df, "Close", "daily_return").unwrap();

        assert_eq!(stats.price.count, 6);
        assert_eq!(stats.returns.count, 5);
        assert!(stats.return_skewness.is_finite());
        assert!(stats.return_kurtosis.is_finite());
        assert!(stats.to_string().contains("excess kurtosis"));
    }

    #[test]
    fn short_returns_leave_higher_moments_undefined() {
        let df = df! {
            "Close" => [100.0, 101.0, 99.0, 102.0],
            "daily_return" => [None, Some(0.01), Some(-0.0198), Some(0.0303)],
        }
        .unwrap();
        let stats = descriptive_stats(&df, "Close", "daily_return").unwrap();
        assert_eq!(stats.returns.count, 3);
        assert!(stats.return_skewness.is_finite());
        assert!(stats.return_kurtosis.is_nan());

        let df = df.head(Some(3));
        let stats = descriptive_stats(&df, "Close", "daily_return").unwrap();
        assert_eq!(stats.returns.count, 2);
        assert!(stats.return_skewness.is_nan());
        assert!(stats.return_kurtosis.is_nan());
    }

    #[test]
    fn empty_column_is_error() {
        let df = df! { "Close" => [1.0, 2.0], "daily_return" => [None::<f64>, None] }.unwrap();
        assert!(descriptive_stats(&df, "Close", "daily_return").is_err());
    }
}
