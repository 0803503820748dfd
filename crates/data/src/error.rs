//! Error types for data acquisition and persistence.

use std::path::PathBuf;

use stockcast_traits::SourceError;

/// Errors that can occur while fetching, writing or reading tables.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The market data source failed.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// Filesystem error.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The provider client could not be created.
    #[error("could not create market data client: {0}")]
    Connector(String),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}

impl DataError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DataError::io(
            "data/raw/X.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "i/o error on data/raw/X.csv: missing");
    }

    #[test]
    fn source_errors_convert() {
        let err: DataError =
            SourceError::Request { symbol: "AAPL".into(), message: "timeout".into() }.into();
        assert!(matches!(err, DataError::Source(_)));
    }
}
