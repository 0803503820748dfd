//! Close-to-close returns.

use polars::prelude::*;
use stockcast_primitives::columns;
use stockcast_traits::{TableTransform, TransformError};

use crate::StatsError;

/// Appends the percentage change of a price column.
///
/// The first row of the output column is null.
#[derive(Debug, Clone)]
pub struct DailyReturns {
    price_column: String,
    output_column: String,
}

impl DailyReturns {
    /// Returns of `Close`, written to `daily_return`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_columns(columns::CLOSE, columns::DAILY_RETURN)
    }

    /// Returns of `price_column`, written to `output_column`.
    #[must_use]
    pub fn with_columns(price_column: impl Into<String>, output_column: impl Into<String>) -> Self {
        Self { price_column: price_column.into(), output_column: output_column.into() }
    }
}

impl Default for DailyReturns {
    fn default() -> Self {
        Self::new()
    }
}

impl TableTransform for DailyReturns {
    fn apply(&self, df: &DataFrame) -> Result<DataFrame, TransformError> {
        if df.column(&self.price_column).is_err() {
            return Err(TransformError::MissingColumn(self.price_column.clone()));
        }
        let price = col(self.price_column.as_str()).cast(DataType::Float64);
        let out = df
            .clone()
            .lazy()
            .with_column(
                (price.clone() / price.shift(lit(1)) - lit(1.0)).alias(self.output_column.as_str()),
            )
            .collect()?;
        Ok(out)
    }

    fn name(&self) -> &str {
        "daily_returns"
    }
}

/// Add a `daily_return` column computed from `Close`.
///
/// # Errors
/// Returns error if the table has no `Close` column.
pub fn add_daily_returns(df: &DataFrame) -> Result<DataFrame, StatsError> {
    Ok(DailyReturns::new().apply(df)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn first_return_is_null() {
        let df = df! { "Close" => [100.0, 110.0, 99.0] }.unwrap();
        let out = add_daily_returns(&df).unwrap();
        let r = out.column("daily_return").unwrap().f64().unwrap();

        assert_eq!(r.get(0), None);
        assert_relative_eq!(r.get(1).unwrap(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(r.get(2).unwrap(), -0.1, epsilon = 1e-12);
    }

    #[test]
    fn input_is_not_mutated() {
        let df = df! { "Close" => [1.0, 2.0] }.unwrap();
        let _ = add_daily_returns(&df).unwrap();
        assert_eq!(df.width(), 1);
    }

    #[test]
    fn custom_columns() {
        let df = df! { "Adj Close" => [10.0, 12.0] }.unwrap();
        let out = DailyReturns::with_columns("Adj Close", "ret").apply(&df).unwrap();
        assert_relative_eq!(out.column("ret").unwrap().f64().unwrap().get(1).unwrap(), 0.2);
    }

    #[test]
    fn missing_price_column() {
        let df = df! { "Open" => [1.0] }.unwrap();
        assert!(matches!(
            add_daily_returns(&df),
            Err(StatsError::Transform(TransformError::MissingColumn(_)))
        ));
    }
}
