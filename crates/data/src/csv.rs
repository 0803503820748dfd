//! CSV persistence of tables.

use std::{
    fs::{self, File},
    path::{Path, PathBuf},
};

use polars::prelude::*;
use stockcast_primitives::columns;
use tracing::info;

use crate::DataError;

/// Write `df` to `save_dir/filename`, creating `save_dir` if needed.
///
/// Dates are written as `YYYY-MM-DD`.
///
/// # Returns
/// The path of the written file.
///
/// # Errors
/// Returns `DataError::Io` if the directory or file cannot be created, or a
/// Polars error if serialisation fails.
pub fn save_to_csv(
    df: &DataFrame,
    filename: &str,
    save_dir: impl AsRef<Path>,
) -> Result<PathBuf, DataError> {
    let save_dir = save_dir.as_ref();
    fs::create_dir_all(save_dir).map_err(|e| DataError::io(save_dir, e))?;
    let path = save_dir.join(filename);

    let mut file = File::create(&path).map_err(|e| DataError::io(&path, e))?;
    let mut out = df.clone();
    CsvWriter::new(&mut file).include_header(true).finish(&mut out)?;

    info!(path = %path.display(), rows = df.height(), "table saved");
    Ok(path)
}

/// Read a table written by [`save_to_csv`].
///
/// Date-like columns are parsed; a `date` column that comes back as a
/// datetime is truncated to dtype `Date`.
///
/// # Errors
/// Returns `DataError::Io` if the file does not exist, or a Polars error if
/// it cannot be parsed.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame, DataError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DataError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }

    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;

    let needs_cast = df
        .column(columns::DATE)
        .is_ok_and(|c| matches!(c.dtype(), DataType::Datetime(_, _) | DataType::String));
    if needs_cast {
        let date = df.column(columns::DATE)?.cast(&DataType::Date)?;
        df.with_column(date)?;
    }

    info!(path = %path.display(), rows = df.height(), columns = df.width(), "table loaded");
    Ok(df)
}
