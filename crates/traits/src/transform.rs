//! Table transformation trait definitions.

use polars::prelude::*;

/// Errors that can occur during transformation.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Empty input data.
    #[error("empty input data")]
    EmptyData,

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Numerical error (NaN, Inf).
    #[error("numerical error: {0}")]
    Numerical(String),

    /// Polars error.
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Copy-then-modify transformation of a date-indexed table.
///
/// Implementations never mutate their input; the returned frame carries
/// every original column plus whatever the transform appends.
pub trait TableTransform: Send + Sync {
    /// Apply the transformation to `df`.
    ///
    /// # Errors
    /// Returns `TransformError` if a required column is missing or the
    /// parameters are invalid.
    fn apply(&self, df: &DataFrame) -> Result<DataFrame, TransformError>;

    /// Returns the name of this transformation.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_error_display() {
        let err = TransformError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = TransformError::MissingColumn("daily_return".to_string());
        assert_eq!(err.to_string(), "missing required column: daily_return");
    }
}
