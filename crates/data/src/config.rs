//! Loader configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where downloaded price tables are cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Directory receiving `{TICKER}_historical.csv` files; created on demand.
    pub save_dir: PathBuf,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { save_dir: PathBuf::from("data/raw") }
    }
}

impl LoaderConfig {
    /// Cache under `save_dir`.
    #[must_use]
    pub fn with_save_dir(save_dir: impl Into<PathBuf>) -> Self {
        Self { save_dir: save_dir.into() }
    }
}
