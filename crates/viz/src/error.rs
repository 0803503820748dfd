//! Error types for chart rendering.

use std::path::PathBuf;

use stockcast_stats::StatsError;

/// Errors that can occur while rendering or writing charts.
#[derive(Debug, thiserror::Error)]
pub enum VizError {
    /// Required column is absent.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Nothing to draw.
    #[error("no finite values to plot in `{0}`")]
    EmptyData(String),

    /// Invalid chart configuration.
    #[error("invalid chart configuration: {0}")]
    InvalidConfig(String),

    /// The drawing backend failed.
    #[error("rendering failed: {0}")]
    Render(String),

    /// Writing the document failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Destination path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Derived column computation failed.
    #[error("statistics error: {0}")]
    Stats(#[from] StatsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),
}
