//! Chart configuration.

use serde::{Deserialize, Serialize};

/// Size and layout of rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Histogram bin count.
    pub bins: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self { width: 1200, height: 600, bins: 50 }
    }
}
