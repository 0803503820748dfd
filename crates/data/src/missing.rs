//! Missing-value report.

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::DataError;

/// Number of missing entries in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCount {
    /// Column name.
    pub column: String,
    /// Nulls plus, for float columns, NaN values.
    pub missing: usize,
}

/// Count missing values per column and log a summary.
///
/// Only columns with at least one missing entry are returned, in table
/// order.
///
/// # Errors
/// Returns a Polars error if a float column cannot be read.
pub fn check_missing_data(df: &DataFrame) -> Result<Vec<MissingCount>, DataError> {
    let mut report = Vec::new();
    for column in df.get_columns() {
        let mut missing = column.null_count();
        if column.dtype().is_float() {
            let values = column.cast(&DataType::Float64)?;
            missing += values.f64()?.into_iter().flatten().filter(|v| v.is_nan()).count();
        }
        if missing > 0 {
            report.push(MissingCount { column: column.name().to_string(), missing });
        }
    }

    if report.is_empty() {
        info!(rows = df.height(), "no missing values");
    } else {
        for entry in &report {
            warn!(column = %entry.column, missing = entry.missing, rows = df.height(), "missing values");
        }
    }
    Ok(report)
}
