//! Analysis settings read from an optional TOML file.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use stockcast::{
    data::LoaderConfig, model::AutoArimaConfig, stats::RiskConfig, viz::ChartConfig,
};

/// Every tunable of one `analyze` run.
///
/// ```toml
/// rolling_windows = [7, 20, 60]
///
/// [loader]
/// save_dir = "data/raw"
///
/// [risk]
/// alpha = 0.01
///
/// [search]
/// criterion = "bic"
/// stepwise = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AnalysisConfig {
    pub(crate) loader: LoaderConfig,
    pub(crate) risk: RiskConfig,
    pub(crate) search: AutoArimaConfig,
    pub(crate) chart: ChartConfig,
    pub(crate) forecast: ForecastSettings,
    /// Rolling statistic windows over daily returns.
    pub(crate) rolling_windows: Vec<usize>,
    /// IQR multiplier of the outlier fences.
    pub(crate) iqr_factor: f64,
    /// Absolute z-score above which a return is an outlier.
    pub(crate) zscore_threshold: f64,
    /// Share of rows used for training when no split date is given.
    pub(crate) train_fraction: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            loader: LoaderConfig::default(),
            risk: RiskConfig::default(),
            search: AutoArimaConfig::default(),
            chart: ChartConfig::default(),
            forecast: ForecastSettings::default(),
            rolling_windows: stockcast::stats::DEFAULT_WINDOWS.to_vec(),
            iqr_factor: 1.5,
            zscore_threshold: 3.0,
            train_fraction: 0.8,
        }
    }
}

/// Forecast horizon and interval width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ForecastSettings {
    /// Two-sided tail probability of the intervals.
    pub(crate) alpha: f64,
    /// Steps forecast when the test partition is empty.
    pub(crate) horizon: usize,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self { alpha: 0.05, horizon: 20 }
    }
}

impl AnalysisConfig {
    /// Read settings from `path`; absent keys keep their defaults.
    pub(crate) fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use stockcast::model::InformationCriterion;

    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AnalysisConfig = toml::from_str(
            r#"
            rolling_windows = [5]

            [risk]
            alpha = 0.01

            [search]
            criterion = "bic"
            stepwise = false
            "#,
        )
        .unwrap();

        assert_eq!(config.rolling_windows, vec![5]);
        assert_eq!(config.risk.alpha, 0.01);
        assert_eq!(config.risk.horizon_days, 1);
        assert_eq!(config.search.criterion, InformationCriterion::Bic);
        assert!(!config.search.stepwise);
        assert_eq!(config.search.max_d, 2);
        assert_eq!(config.forecast, ForecastSettings::default());
        assert_eq!(config.loader, LoaderConfig::default());
    }

    #[test]
    fn empty_toml_is_default() {
        let config: AnalysisConfig = toml::from_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }
}
