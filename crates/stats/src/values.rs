//! Column extraction helpers.

use polars::prelude::*;

use crate::StatsError;

/// Values of `column` as `f64`, nulls kept as `None`, in row order.
///
/// # Errors
/// Returns `MissingColumn` if the column does not exist, or a Polars error if
/// it cannot be cast to `Float64`.
pub fn column_options(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, StatsError> {
    let col = df.column(column).map_err(|_| StatsError::MissingColumn(column.to_string()))?;
    let cast = col.cast(&DataType::Float64)?;
    Ok(cast.f64()?.into_iter().collect())
}

/// Finite values of `column` with nulls and NaN removed.
///
/// # Errors
/// Same as [`column_options`].
pub fn column_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, StatsError> {
    Ok(column_options(df, column)?.into_iter().flatten().filter(|v| v.is_finite()).collect())
}
