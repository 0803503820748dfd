//! Rolling window statistics.

use polars::prelude::*;
use stockcast_primitives::columns;
use stockcast_traits::{TableTransform, TransformError};

use crate::StatsError;

/// Default rolling windows in trading days.
pub const DEFAULT_WINDOWS: [usize; 3] = [7, 20, 60];

/// Appends rolling mean, standard deviation and variance columns.
///
/// For each window `w` the columns `rolling_mean_{w}d`, `rolling_std_{w}d`
/// and `rolling_var_{w}d` are added. Statistics use `ddof = 1` and require a
/// full window, so the first `w - 1` rows are null.
#[derive(Debug, Clone)]
pub struct RollingStats {
    windows: Vec<usize>,
    column: String,
}

impl RollingStats {
    /// Create a transform over `column` for the given windows.
    #[must_use]
    pub fn new(windows: impl Into<Vec<usize>>, column: impl Into<String>) -> Self {
        Self { windows: windows.into(), column: column.into() }
    }

    /// Window sizes.
    #[must_use]
    pub fn windows(&self) -> &[usize] {
        &self.windows
    }

    /// Source column.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Default for RollingStats {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOWS.to_vec(), columns::DAILY_RETURN)
    }
}

impl TableTransform for RollingStats {
    fn apply(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        if self.windows.is_empty() {
            return Err(TransformError::InvalidParameter("no rolling windows given".to_string()));
        }
        if let Some(w) = self.windows.iter().find(|&&w| w == 0) {
            return Err(TransformError::InvalidParameter(format!("window must be positive, got {w}")));
        }
        if df.column(&self.column).is_err() {
            return Err(TransformError::MissingColumn(self.column.clone()));
        }

        let source = col(self.column.as_str()).cast(DataType::Float64);
        let mut exprs = Vec::with_capacity(self.windows.len() * 3);
        for &w in &self.windows {
            let options = RollingOptionsFixedWindow {
                window_size: w,
                min_periods: w,
                ..Default::default()
            };
            exprs.push(source.clone().rolling_mean(options.clone()).alias(columns::rolling_mean(w)));
            exprs.push(source.clone().rolling_std(options.clone()).alias(columns::rolling_std(w)));
            exprs.push(source.clone().rolling_var(options).alias(columns::rolling_var(w)));
        }

        Ok(df.clone().lazy().with_columns(exprs).collect()?)
    }

    fn name(&self) -> &str {
        "rolling_stats"
    }
}

/// Add rolling statistics of `column` for each window in `windows`.
///
/// # Errors
/// Returns error if `windows` is empty or holds a zero, or `column` is missing.
pub fn add_rolling_stats(
    df: &DataFrame,
    windows: &[usize],
    column: &str,
) -> Result<DataFrame, StatsError> {
    Ok(RollingStats::new(windows.to_vec(), column).apply(df)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    fn sample() -> DataFrame {
        let values: Vec<f64> = (0..30).map(|i| ((i * 7) % 11) as f64 / 100.0).collect();
        df! { "daily_return" => values }.unwrap()
    }

    #[rstest]
    #[case(2)]
    #[case(3)]
    #[case(7)]
    #[case(20)]
    fn leading_nulls_match_window(#[case] w: usize) {
        let out = add_rolling_stats(&sample(), &[w], "daily_return").unwrap();
        for name in [columns::rolling_mean(w), columns::rolling_std(w), columns::rolling_var(w)] {
            let c = out.column(&name).unwrap();
            assert_eq!(c.null_count(), w - 1, "{name}");
            assert!(c.f64().unwrap().get(w - 1).is_some(), "{name}");
        }
    }

    #[test]
    fn default_windows_add_nine_columns() {
        let df = df! { "daily_return" => vec![0.01; 80] }.unwrap();
        let out = RollingStats::default().apply(&df).unwrap();
        assert_eq!(out.width(), 10);
        assert!(out.column("rolling_var_60d").is_ok());
    }

    #[test]
    fn values_match_sample_statistics() {
        let df = df! { "x" => [1.0, 2.0, 3.0, 4.0] }.unwrap();
        let out = add_rolling_stats(&df, &[3], "x").unwrap();

        let mean = out.column("rolling_mean_3d").unwrap().f64().unwrap();
        let var = out.column("rolling_var_3d").unwrap().f64().unwrap();
        let std = out.column("rolling_std_3d").unwrap().f64().unwrap();
        assert_relative_eq!(mean.get(2).unwrap(), 2.0);
        assert_relative_eq!(mean.get(3).unwrap(), 3.0);
        assert_relative_eq!(var.get(3).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(std.get(3).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_windows() {
        let df = sample();
        assert!(add_rolling_stats(&df, &[], "daily_return").is_err());
        assert!(add_rolling_stats(&df, &[0], "daily_return").is_err());
        assert!(add_rolling_stats(&df, &[5], "missing").is_err());
    }
}
