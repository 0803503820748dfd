//! Train/test split on a date boundary.

use polars::prelude::*;
use stockcast_primitives::{Date, columns, from_epoch_days};
use tracing::{info, warn};

use crate::ModelError;

/// Training and testing partitions of a date-indexed table.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    /// Rows dated on or before the split date.
    pub train: DataFrame,
    /// Rows dated after the split date.
    pub test: DataFrame,
    /// The split date.
    pub split_date: Date,
}

/// Dates of the `date` column as days since 1970-01-01.
///
/// # Errors
/// Returns `InvalidIndex` if the column is missing, is not of dtype `Date`,
/// contains nulls, or is not strictly increasing.
pub fn date_index(df: &DataFrame) -> Result<Vec<i32>, ModelError> {
    let column = df.column(columns::DATE).map_err(|_| {
        ModelError::InvalidIndex(format!("table has no `{}` column", columns::DATE))
    })?;
    if column.dtype() != &DataType::Date {
        return Err(ModelError::InvalidIndex(format!(
            "`{}` column has dtype {}, expected date",
            columns::DATE,
            column.dtype()
        )));
    }

    let days = column.cast(&DataType::Int32)?;
    let days: Vec<Option<i32>> = days.i32()?.into_iter().collect();
    let days: Vec<i32> = days
        .into_iter()
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| ModelError::InvalidIndex("date column contains nulls".to_string()))?;

    if let Some(pos) = days.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ModelError::InvalidIndex(format!(
            "dates are not strictly increasing at row {}",
            pos + 1
        )));
    }
    Ok(days)
}

/// Split `df` into rows dated `<= split_date` and rows dated `> split_date`.
///
/// Empty partitions are logged as warnings, not errors. Date ranges and row
/// counts of both partitions are logged at info level.
///
/// # Errors
/// Returns `InvalidIndex` if the table is not indexed by a strictly
/// increasing `Date` column.
pub fn split_time_series(df: &DataFrame, split_date: Date) -> Result<TrainTestSplit, ModelError> {
    let days = date_index(df)?;
    let cutoff = stockcast_primitives::epoch_days(split_date);

    let mask: Vec<bool> = days.iter().map(|&d| d <= cutoff).collect();
    let train_mask = BooleanChunked::from_slice("train".into(), &mask);
    let train = df.filter(&train_mask)?;
    let test = df.filter(&!&train_mask)?;

    let n_train = train.height();
    let (train_days, test_days) = days.split_at(n_train);
    log_partition("training", train_days);
    log_partition("testing", test_days);

    Ok(TrainTestSplit { train, test, split_date })
}

fn log_partition(label: &str, days: &[i32]) {
    let first = days.first().copied().and_then(from_epoch_days);
    let last = days.last().copied().and_then(from_epoch_days);
    match (first, last) {
        (Some(first), Some(last)) => {
            info!(partition = label, rows = days.len(), %first, %last, "split partition");
        }
        _ => warn!(partition = label, "split produced an empty partition"),
    }
}
