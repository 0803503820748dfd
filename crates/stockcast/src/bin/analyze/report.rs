//! Summary of one analysis run.

use std::fmt;

use serde::Serialize;
use stockcast::{
    data::MissingCount,
    model::{AutoArimaResult, ForecastAccuracy, InformationCriterion, SarimaFit, SarimaSpec},
    primitives::Date,
    stats::{AdfResult, DescriptiveStats, RiskReport},
};

/// Everything `analyze` computed, serialised to `report.json`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AnalysisReport {
    pub(crate) symbol: String,
    pub(crate) start: Date,
    pub(crate) end: Date,
    pub(crate) rows: usize,
    pub(crate) missing: Vec<MissingCount>,
    pub(crate) outliers: OutlierCounts,
    pub(crate) risk: RiskReport,
    pub(crate) descriptive: DescriptiveStats,
    pub(crate) stationarity: AdfResult,
    pub(crate) split_date: Date,
    pub(crate) train_rows: usize,
    pub(crate) test_rows: usize,
    pub(crate) model: ModelSummary,
    pub(crate) accuracy: Option<ForecastAccuracy>,
}

/// Returns flagged by each outlier policy.
#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct OutlierCounts {
    pub(crate) iqr: usize,
    pub(crate) zscore: usize,
}

/// Selected model and its fit statistics.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct ModelSummary {
    pub(crate) spec: SarimaSpec,
    pub(crate) criterion: InformationCriterion,
    pub(crate) score: f64,
    pub(crate) candidates_fitted: usize,
    pub(crate) candidates_tried: usize,
    pub(crate) aic: f64,
    pub(crate) bic: f64,
    pub(crate) sigma2: f64,
    pub(crate) log_likelihood: f64,
    pub(crate) converged: bool,
}

impl ModelSummary {
    pub(crate) fn new(fit: &SarimaFit, search: &AutoArimaResult) -> Self {
        Self {
            spec: *fit.spec(),
            criterion: search.criterion,
            score: search.score,
            candidates_fitted: search.n_fitted(),
            candidates_tried: search.candidates.len(),
            aic: fit.aic(),
            bic: fit.bic(),
            sigma2: fit.sigma2(),
            log_likelihood: fit.log_likelihood(),
            converged: fit.converged(),
        }
    }
}

impl fmt::Display for AnalysisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} from {} to {} ({} rows)", self.symbol, self.start, self.end, self.rows)?;
        writeln!(f)?;

        if self.missing.is_empty() {
            writeln!(f, "Missing values: none")?;
        } else {
            writeln!(f, "Missing values:")?;
            for m in &self.missing {
                writeln!(f, "  {:<12} {}", m.column, m.missing)?;
            }
        }
        writeln!(f, "Outliers: {} (IQR), {} (z-score)", self.outliers.iqr, self.outliers.zscore)?;
        writeln!(f)?;

        let risk = &self.risk;
        let confidence = (1.0 - risk.alpha) * 100.0;
        writeln!(f, "{confidence:.0}% {}-day VaR", risk.horizon_days)?;
        writeln!(f, "  historical   {:>10.4}", risk.historical_var)?;
        writeln!(f, "  parametric   {:>10.4}", risk.parametric_var)?;
        writeln!(f, "  monte carlo  {:>10.4}", risk.monte_carlo_var)?;
        writeln!(f, "Sharpe ratio   {:>10.4}", risk.sharpe_ratio)?;
        writeln!(f)?;

        write!(f, "{}", self.descriptive)?;
        writeln!(f)?;

        let adf = &self.stationarity;
        writeln!(
            f,
            "ADF ({}): statistic {:.4}, p-value {:.4}, lags {}",
            adf.title, adf.statistic, adf.p_value, adf.used_lag
        )?;
        writeln!(f)?;

        let model = &self.model;
        writeln!(
            f,
            "Split at {}: {} training rows, {} testing rows",
            self.split_date, self.train_rows, self.test_rows
        )?;
        writeln!(
            f,
            "Selected {} ({} {:.2}, {} of {} candidates fitted)",
            model.spec,
            model.criterion,
            model.score,
            model.candidates_fitted,
            model.candidates_tried
        )?;
        writeln!(
            f,
            "  sigma2 {:.6}, log-likelihood {:.2}, BIC {:.2}{}",
            model.sigma2,
            model.log_likelihood,
            model.bic,
            if model.converged { "" } else { " (not converged)" }
        )?;

        match &self.accuracy {
            Some(acc) => writeln!(
                f,
                "Forecast accuracy over {} days: MAE {:.4}, RMSE {:.4}, MAPE {:.2}%",
                acc.n, acc.mae, acc.rmse, acc.mape
            ),
            None => writeln!(f, "No held-out data to score the forecast against"),
        }
    }
}
