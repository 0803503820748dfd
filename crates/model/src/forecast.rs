//! Forecast tables and accuracy metrics.

use chrono::{Datelike, Weekday};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use stockcast_primitives::{Date, columns};
use stockcast_traits::Forecaster;
use tracing::info;

use crate::ModelError;

/// Forecast `n_periods` steps and attach them to `index` by position.
///
/// The returned table has columns `date`, `forecast`, `lower_ci` and
/// `upper_ci`, one row per step. `alpha` is the two-sided tail probability,
/// so 0.05 gives a 95% interval.
///
/// `index` is taken as given: its dates are not checked against the end of
/// the training data, so a caller passing stale or unordered dates gets
/// forecasts labelled with those dates.
///
/// # Errors
/// Returns `InvalidConfig` if `n_periods` is zero, `IndexLengthMismatch` if
/// `index` does not hold exactly `n_periods` dates, or the model's error if
/// forecasting fails.
pub fn generate_forecast<F>(
    model: &F,
    n_periods: usize,
    index: &[Date],
    alpha: f64,
) -> Result<DataFrame, ModelError>
where
    F: Forecaster + ?Sized,
{
    if n_periods == 0 {
        return Err(ModelError::InvalidConfig("forecast horizon must be positive".to_string()));
    }
    if index.len() != n_periods {
        return Err(ModelError::IndexLengthMismatch { expected: n_periods, actual: index.len() });
    }

    let path = model.forecast(n_periods, alpha)?;
    info!(
        steps = n_periods,
        confidence = path.confidence(),
        first = %index[0],
        last = %index[n_periods - 1],
        "forecast generated"
    );

    let df = DataFrame::new(vec![
        Column::new(columns::DATE.into(), index.to_vec()),
        Column::new(columns::FORECAST.into(), path.mean),
        Column::new(columns::LOWER_CI.into(), path.lower),
        Column::new(columns::UPPER_CI.into(), path.upper),
    ])?;
    Ok(df)
}

/// The `n` weekdays following `last`.
///
/// Exchange holidays are not known, so this only skips weekends.
#[must_use]
pub fn business_days_after(last: Date, n: usize) -> Vec<Date> {
    std::iter::successors(last.succ_opt(), |d| d.succ_opt())
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .take(n)
        .collect()
}

/// Errors of a forecast against held-out observations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error over non-zero actuals, in percent;
    /// NaN when every actual is zero.
    pub mape: f64,
    /// Number of compared points.
    pub n: usize,
}

/// Compare `forecast` with `actual` point by point.
///
/// # Errors
/// Returns `InvalidConfig` if the slices are empty or differ in length.
pub fn forecast_accuracy(actual: &[f64], forecast: &[f64]) -> Result<ForecastAccuracy, ModelError> {
    if actual.is_empty() || actual.len() != forecast.len() {
        return Err(ModelError::InvalidConfig(format!(
            "cannot compare {} actual values with {} forecasts",
            actual.len(),
            forecast.len()
        )));
    }
    let n = actual.len();
    let errors: Vec<f64> = actual.iter().zip(forecast).map(|(a, f)| a - f).collect();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n as f64;
    let rmse = (errors.iter().map(|e| e * e).sum::<f64>() / n as f64).sqrt();

    let (pct_sum, pct_n) = actual
        .iter()
        .zip(&errors)
        .filter(|(a, _)| **a != 0.0)
        .fold((0.0, 0usize), |(s, c), (a, e)| (s + (e / a).abs(), c + 1));
    let mape = if pct_n > 0 { 100.0 * pct_sum / pct_n as f64 } else { f64::NAN };

    Ok(ForecastAccuracy { mae, rmse, mape, n })
}
