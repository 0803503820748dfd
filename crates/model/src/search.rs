//! Automatic SARIMA order selection.
//!
//! Differencing orders come from unit-root style tests (KPSS for `d`,
//! seasonal strength for `D`); the ARMA orders and the constant are chosen
//! by the stepwise algorithm of Hyndman and Khandakar, or by an exhaustive
//! parallel grid.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use stockcast_math::{NelderMeadConfig, difference, seasonal_difference};
use stockcast_primitives::{ArimaOrder, SeasonalOrder};
use stockcast_stats::{column_options, kpss_test};
use stockcast_traits::{EstimatorError, ModelEstimator};
use tracing::{debug, error, info, warn};

use crate::{
    InformationCriterion, ModelError, SarimaConfig, SarimaEstimator, SarimaFit, SarimaSpec,
    seasonal_strength,
};

/// Configuration for [`AutoArima`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoArimaConfig {
    /// Whether to consider seasonal terms.
    pub seasonal: bool,
    /// Season length in observations; used when `seasonal` is set.
    pub period: usize,
    /// Fixed differencing order; chosen by KPSS tests when `None`.
    pub d: Option<usize>,
    /// Fixed seasonal differencing order; chosen by seasonal strength when `None`.
    pub seasonal_d: Option<usize>,
    /// Largest differencing order the KPSS procedure may choose.
    pub max_d: usize,
    /// Largest seasonal differencing order.
    pub max_seasonal_d: usize,
    /// Largest non-seasonal AR order.
    pub max_p: usize,
    /// Largest non-seasonal MA order.
    pub max_q: usize,
    /// Largest seasonal AR order.
    pub max_seasonal_p: usize,
    /// Largest seasonal MA order.
    pub max_seasonal_q: usize,
    /// Largest `p + q + P + Q`.
    pub max_order: usize,
    /// Stepwise search when set, exhaustive grid otherwise.
    pub stepwise: bool,
    /// Maximum number of candidate fits in a stepwise search.
    pub max_steps: usize,
    /// Whether a constant may be estimated (only when `d + D < 2`).
    pub allow_constant: bool,
    /// Criterion to minimise.
    pub criterion: InformationCriterion,
    /// Significance level of the KPSS tests.
    pub test_alpha: f64,
    /// Seasonal strength above which the series is seasonally differenced.
    pub seasonal_strength_threshold: f64,
    /// Optimiser used for candidate fits.
    #[serde(skip, default = "candidate_optimizer")]
    pub search_optimizer: NelderMeadConfig,
    /// Optimiser used to refit the selected order.
    #[serde(skip)]
    pub final_optimizer: NelderMeadConfig,
}

fn candidate_optimizer() -> NelderMeadConfig {
    NelderMeadConfig { max_iter: 500, xatol: 1e-4, fatol: 1e-6, ..Default::default() }
}

impl Default for AutoArimaConfig {
    fn default() -> Self {
        Self {
            seasonal: false,
            period: 1,
            d: None,
            seasonal_d: None,
            max_d: 2,
            max_seasonal_d: 1,
            max_p: 5,
            max_q: 5,
            max_seasonal_p: 2,
            max_seasonal_q: 2,
            max_order: 5,
            stepwise: true,
            max_steps: 100,
            allow_constant: true,
            criterion: InformationCriterion::Aic,
            test_alpha: 0.05,
            seasonal_strength_threshold: 0.64,
            search_optimizer: candidate_optimizer(),
            final_optimizer: NelderMeadConfig::default(),
        }
    }
}

impl AutoArimaConfig {
    /// Default configuration with seasonal terms of length `period`.
    #[must_use]
    pub fn seasonal(period: usize) -> Self {
        Self { seasonal: true, period, ..Self::default() }
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.seasonal && self.period < 2 {
            return Err(ModelError::InvalidConfig(format!(
                "seasonal search needs a period of at least 2, got {}",
                self.period
            )));
        }
        if !(self.test_alpha > 0.0 && self.test_alpha < 1.0) {
            return Err(ModelError::InvalidConfig(format!(
                "test_alpha must be in (0, 1), got {}",
                self.test_alpha
            )));
        }
        if self.max_steps == 0 {
            return Err(ModelError::InvalidConfig("max_steps must be positive".to_string()));
        }
        Ok(())
    }

    const fn allows(&self, spec: &SarimaSpec) -> bool {
        let s = spec.seasonal;
        spec.order.p <= self.max_p
            && spec.order.q <= self.max_q
            && s.p <= self.max_seasonal_p
            && s.q <= self.max_seasonal_q
            && spec.order.p + spec.order.q + s.p + s.q <= self.max_order
    }
}

/// One candidate tried during the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateFit {
    /// Candidate orders.
    pub spec: SarimaSpec,
    /// Criterion value, when the fit succeeded.
    pub score: Option<f64>,
    /// Failure reason, when it did not.
    pub failure: Option<String>,
}

/// Summary of an order search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoArimaResult {
    /// Selected orders.
    pub best: SarimaSpec,
    /// Criterion value of the selected orders.
    pub score: f64,
    /// Criterion used for ranking.
    pub criterion: InformationCriterion,
    /// Chosen differencing order.
    pub d: usize,
    /// Chosen seasonal differencing order.
    pub seasonal_d: usize,
    /// Whether the stepwise algorithm was used.
    pub stepwise: bool,
    /// Every candidate in the order it was tried.
    pub candidates: Vec<CandidateFit>,
}

impl AutoArimaResult {
    /// Number of candidates that were fitted successfully.
    #[must_use]
    pub fn n_fitted(&self) -> usize {
        self.candidates.iter().filter(|c| c.score.is_some()).count()
    }
}

/// Number of first differences needed for KPSS to retain level stationarity.
///
/// # Errors
/// Returns error if the KPSS test cannot be computed.
pub fn ndiffs(values: &[f64], alpha: f64, max_d: usize) -> Result<usize, ModelError> {
    let mut x = values.to_vec();
    let mut d = 0;
    while d < max_d && x.len() >= 3 && !is_constant(&x) {
        let test = kpss_test(&x, None)?;
        if test.is_stationary(alpha) {
            break;
        }
        x = difference(&x, 1);
        d += 1;
    }
    Ok(d)
}

/// Number of seasonal differences needed to bring the seasonal strength
/// to `threshold` or below.
///
/// Series shorter than two periods are never seasonally differenced.
///
/// # Errors
/// Returns error if the seasonal strength cannot be computed.
pub fn nsdiffs(
    values: &[f64],
    period: usize,
    threshold: f64,
    max_seasonal_d: usize,
) -> Result<usize, ModelError> {
    let mut x = values.to_vec();
    let mut seasonal_d = 0;
    while seasonal_d < max_seasonal_d && period >= 2 && x.len() >= 2 * period {
        if seasonal_strength(&x, period)? <= threshold {
            break;
        }
        x = seasonal_difference(&x, period, 1);
        seasonal_d += 1;
    }
    Ok(seasonal_d)
}

fn is_constant(x: &[f64]) -> bool {
    x.windows(2).all(|w| (w[1] - w[0]).abs() <= f64::EPSILON * w[0].abs().max(1.0))
}

/// Automatic SARIMA order search.
#[derive(Debug, Clone, Default)]
pub struct AutoArima {
    config: AutoArimaConfig,
}

type Attempt = (CandidateFit, Option<SarimaFit>);

impl AutoArima {
    /// Create a search with the given configuration.
    #[must_use]
    pub const fn with_config(config: AutoArimaConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &AutoArimaConfig {
        &self.config
    }

    /// Select orders for `series` and refit the winner at full precision.
    ///
    /// # Errors
    /// Returns `InvalidConfig` for an unusable configuration, an estimator
    /// error for non-finite input, and `SearchFailed` if no candidate could
    /// be fitted.
    pub fn search(&self, series: &[f64]) -> Result<(SarimaFit, AutoArimaResult), ModelError> {
        let config = &self.config;
        config.validate()?;
        if series.iter().any(|v| !v.is_finite()) {
            return Err(EstimatorError::NonFinite.into());
        }

        let period = if config.seasonal { config.period } else { 0 };
        let seasonal_d = match (config.seasonal, config.seasonal_d) {
            (false, _) => 0,
            (true, Some(fixed)) => fixed,
            (true, None) => nsdiffs(
                series,
                period,
                config.seasonal_strength_threshold,
                config.max_seasonal_d,
            )?,
        };
        let d = match config.d {
            Some(fixed) => fixed,
            None => ndiffs(
                &seasonal_difference(series, period, seasonal_d),
                config.test_alpha,
                config.max_d,
            )?,
        };
        let with_constant = config.allow_constant && d + seasonal_d < 2;
        info!(d, seasonal_d, period, with_constant, "differencing orders selected");

        let mut candidates = Vec::new();
        let best = if config.stepwise {
            self.stepwise(series, d, seasonal_d, period, with_constant, &mut candidates)
        } else {
            self.grid(series, d, seasonal_d, period, with_constant, &mut candidates)
        };

        let Some(best) = best else {
            let last = candidates.iter().rev().find_map(|c| c.failure.clone());
            return Err(ModelError::SearchFailed(format!(
                "none of {} candidate orders could be fitted{}",
                candidates.len(),
                last.map(|reason| format!("; last error: {reason}")).unwrap_or_default()
            )));
        };
        let score = best.criterion(config.criterion);
        info!(
            model = %best.spec(),
            criterion = %config.criterion,
            score,
            tried = candidates.len(),
            "best candidate selected"
        );

        let refit = SarimaEstimator::with_config(
            SarimaConfig::for_spec(*best.spec()).with_optimizer(config.final_optimizer),
        )
        .fit_from(series, best.unconstrained_params())?;
        let result = AutoArimaResult {
            best: *best.spec(),
            score: refit.criterion(config.criterion),
            criterion: config.criterion,
            d,
            seasonal_d,
            stepwise: config.stepwise,
            candidates,
        };
        if result.score > score {
            warn!(search = score, refit = result.score, "refit scored worse than the candidate fit");
        }
        Ok((refit, result))
    }

    fn attempt(&self, series: &[f64], spec: SarimaSpec) -> Attempt {
        let estimator = SarimaEstimator::with_config(
            SarimaConfig::for_spec(spec).with_optimizer(self.config.search_optimizer),
        );
        let outcome = estimator.fit(series).and_then(|fit| {
            let score = fit.criterion(self.config.criterion);
            if score.is_finite() {
                Ok((score, fit))
            } else {
                Err(EstimatorError::Numerical(format!("{} is not finite", self.config.criterion)))
            }
        });
        match outcome {
            Ok((score, fit)) => {
                debug!(model = %spec, score, "candidate fitted");
                (CandidateFit { spec, score: Some(score), failure: None }, Some(fit))
            }
            Err(err) => {
                debug!(model = %spec, error = %err, "candidate skipped");
                (CandidateFit { spec, score: None, failure: Some(err.to_string()) }, None)
            }
        }
    }

    fn stepwise(
        &self,
        series: &[f64],
        d: usize,
        seasonal_d: usize,
        period: usize,
        with_constant: bool,
        candidates: &mut Vec<CandidateFit>,
    ) -> Option<SarimaFit> {
        let config = &self.config;
        let seasonal = config.seasonal;
        let make = |p: usize, q: usize, sp: usize, sq: usize, constant: bool| {
            let (sp, sq) = if seasonal { (sp, sq) } else { (0, 0) };
            SarimaSpec::new(
                ArimaOrder::new(p, d, q),
                SeasonalOrder::new(sp, seasonal_d, sq, period),
                constant,
            )
        };

        let mut visited: HashMap<SarimaSpec, Option<f64>> = HashMap::new();
        let mut best: Option<SarimaFit> = None;
        let mut best_score = f64::INFINITY;
        // Returns `None` when the candidate was skipped, otherwise whether it
        // improved on the incumbent.
        let mut try_spec = |spec: SarimaSpec, best: &mut Option<SarimaFit>, best_score: &mut f64| {
            if visited.contains_key(&spec) || !config.allows(&spec) {
                return None;
            }
            let (candidate, fit) = self.attempt(series, spec);
            visited.insert(spec, candidate.score);
            candidates.push(candidate);
            Some(match fit {
                Some(fit) if fit.criterion(config.criterion) < *best_score => {
                    *best_score = fit.criterion(config.criterion);
                    *best = Some(fit);
                    true
                }
                _ => false,
            })
        };

        let mut initial = vec![
            make(config.max_p.min(2), config.max_q.min(2), 1, 1, with_constant),
            make(0, 0, 0, 0, with_constant),
            make(1, 0, 1, 0, with_constant),
            make(0, 1, 0, 1, with_constant),
        ];
        if with_constant {
            initial.push(make(0, 0, 0, 0, false));
        }
        let mut fitted = 0;
        for spec in initial {
            fitted += usize::from(try_spec(spec, &mut best, &mut best_score).is_some());
        }

        'search: while fitted < config.max_steps {
            let Some(current) = best.as_ref().map(|fit| *fit.spec()) else {
                break;
            };
            for neighbor in neighbors(&current, seasonal, with_constant) {
                if fitted >= config.max_steps {
                    break 'search;
                }
                match try_spec(neighbor, &mut best, &mut best_score) {
                    Some(true) => {
                        fitted += 1;
                        continue 'search;
                    }
                    Some(false) => fitted += 1,
                    None => {}
                }
            }
            break;
        }
        if fitted >= config.max_steps {
            warn!(max_steps = config.max_steps, "stepwise search stopped at the step limit");
        }
        best
    }

    fn grid(
        &self,
        series: &[f64],
        d: usize,
        seasonal_d: usize,
        period: usize,
        with_constant: bool,
        candidates: &mut Vec<CandidateFit>,
    ) -> Option<SarimaFit> {
        let config = &self.config;
        let (max_sp, max_sq) =
            if config.seasonal { (config.max_seasonal_p, config.max_seasonal_q) } else { (0, 0) };
        let constants: &[bool] = if with_constant { &[true, false] } else { &[false] };

        let mut specs = Vec::new();
        for p in 0..=config.max_p {
            for q in 0..=config.max_q {
                for sp in 0..=max_sp {
                    for sq in 0..=max_sq {
                        for &constant in constants {
                            let spec = SarimaSpec::new(
                                ArimaOrder::new(p, d, q),
                                SeasonalOrder::new(sp, seasonal_d, sq, period),
                                constant,
                            );
                            if config.allows(&spec) {
                                specs.push(spec);
                            }
                        }
                    }
                }
            }
        }
        debug!(candidates = specs.len(), "exhaustive search");

        let attempts: Vec<Attempt> =
            specs.into_par_iter().map(|spec| self.attempt(series, spec)).collect();
        let mut best: Option<(f64, SarimaFit)> = None;
        for (candidate, fit) in attempts {
            if let (Some(score), Some(fit)) = (candidate.score, fit) {
                if best.as_ref().is_none_or(|(current, _)| score < *current) {
                    best = Some((score, fit));
                }
            }
            candidates.push(candidate);
        }
        best.map(|(_, fit)| fit)
    }
}

/// Stepwise neighbours of `spec`, in the order they are tried.
fn neighbors(spec: &SarimaSpec, seasonal: bool, with_constant: bool) -> Vec<SarimaSpec> {
    let ArimaOrder { p, d, q } = spec.order;
    let s = spec.seasonal;
    let c = spec.include_constant;
    let shift = |value: usize, delta: isize| value.checked_add_signed(delta);
    let mut moves: Vec<(isize, isize, isize, isize)> = Vec::new();
    if seasonal {
        moves.extend([(0, 0, -1, 0), (0, 0, 1, 0), (0, 0, 0, -1), (0, 0, 0, 1)]);
        moves.extend([(0, 0, -1, -1), (0, 0, 1, 1), (0, 0, -1, 1), (0, 0, 1, -1)]);
    }
    moves.extend([(-1, 0, 0, 0), (1, 0, 0, 0), (0, -1, 0, 0), (0, 1, 0, 0)]);
    moves.extend([(-1, -1, 0, 0), (1, 1, 0, 0), (-1, 1, 0, 0), (1, -1, 0, 0)]);

    let mut out: Vec<SarimaSpec> = moves
        .into_iter()
        .filter_map(|(dp, dq, dsp, dsq)| {
            Some(SarimaSpec::new(
                ArimaOrder::new(shift(p, dp)?, d, shift(q, dq)?),
                SeasonalOrder::new(shift(s.p, dsp)?, s.d, shift(s.q, dsq)?, s.period),
                c,
            ))
        })
        .collect();
    if with_constant {
        out.push(SarimaSpec { include_constant: !c, ..*spec });
    }
    out
}

/// Search orders for `column` of the training table and fit the winner.
///
/// Null values are dropped with a warning before the search. Any error is
/// logged and returned unchanged.
///
/// # Errors
/// Returns `MissingColumn` if `column` does not exist, otherwise any error
/// of [`AutoArima::search`].
pub fn train_auto_arima(
    train: &DataFrame,
    column: &str,
    config: &AutoArimaConfig,
) -> Result<(SarimaFit, AutoArimaResult), ModelError> {
    let run = || -> Result<(SarimaFit, AutoArimaResult), ModelError> {
        let options = column_options(train, column)
            .map_err(|_| ModelError::MissingColumn(column.to_string()))?;
        let series: Vec<f64> = options.iter().flatten().copied().collect();
        if series.len() < options.len() {
            warn!(column, dropped = options.len() - series.len(), "null values dropped before fitting");
        }
        info!(column, n_obs = series.len(), seasonal = config.seasonal, "searching model orders");
        AutoArima::with_config(config.clone()).search(&series)
    };
    run().inspect_err(|err| error!(column, error = %err, "model training failed"))
}
