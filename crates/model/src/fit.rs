//! Exact maximum-likelihood SARIMA estimation.

use std::fmt;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use stockcast_math::{
    NelderMead, NelderMeadConfig, difference, mean, norm_ppf, ols, seasonal_difference, std_dev,
};
use stockcast_primitives::ForecastPath;
use stockcast_traits::{EstimatorError, Forecaster, ModelEstimator};
use tracing::{debug, trace};

use crate::{
    SarimaParams, SarimaSpec,
    kalman::{ArmaStateSpace, FilterOutput},
    polynomial::{constrain_stationary, multiply, psi_weights, unconstrain_stationary},
};

/// Criterion used to rank candidate models; lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    /// Akaike information criterion.
    #[default]
    Aic,
    /// Small-sample corrected AIC.
    Aicc,
    /// Bayesian (Schwarz) information criterion.
    Bic,
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aic => write!(f, "AIC"),
            Self::Aicc => write!(f, "AICc"),
            Self::Bic => write!(f, "BIC"),
        }
    }
}

/// Configuration for [`SarimaEstimator`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SarimaConfig {
    /// Model orders.
    pub spec: SarimaSpec,
    /// Optimiser settings.
    pub optimizer: NelderMeadConfig,
}

impl SarimaConfig {
    /// Configuration for `spec` with default optimiser settings.
    #[must_use]
    pub fn for_spec(spec: SarimaSpec) -> Self {
        Self { spec, optimizer: NelderMeadConfig::default() }
    }

    /// Replace the optimiser settings.
    #[must_use]
    pub const fn with_optimizer(mut self, optimizer: NelderMeadConfig) -> Self {
        self.optimizer = optimizer;
        self
    }
}

/// Maximum-likelihood SARIMA estimator.
///
/// The series is differenced by `(1 - B)^d (1 - B^s)^D`, the constant (if
/// any) is removed, and the exact Gaussian likelihood of the remaining ARMA
/// process is evaluated by a Kalman filter started from the stationary state
/// distribution. The innovation variance is concentrated out and the
/// remaining coefficients are optimised by Nelder-Mead in an unconstrained
/// parametrisation that keeps the AR part stationary and the MA part
/// invertible.
#[derive(Debug, Clone, Copy, Default)]
pub struct SarimaEstimator {
    config: SarimaConfig,
}

/// Data shared by every likelihood evaluation of one fit.
struct Problem<'a> {
    spec: SarimaSpec,
    period: usize,
    differenced: &'a [f64],
    center: f64,
    scale: f64,
}

impl Problem<'_> {
    fn params(&self, x: &[f64]) -> SarimaParams {
        let s = self.spec.effective_seasonal();
        let (constant, rest) = x.split_at(usize::from(self.spec.include_constant));
        let (ar, rest) = rest.split_at(self.spec.order.p);
        let (seasonal_ar, rest) = rest.split_at(s.p);
        let (ma, seasonal_ma) = rest.split_at(self.spec.order.q);
        let constant = constant.first().map(|u| self.center + self.scale * u);
        let ar = constrain_stationary(ar);
        let seasonal_ar = constrain_stationary(seasonal_ar);
        let ma = constrain_stationary(ma).iter().map(|c| -c).collect();
        let seasonal_ma = constrain_stationary(seasonal_ma).iter().map(|c| -c).collect();
        SarimaParams { constant, ar, seasonal_ar, ma, seasonal_ma }
    }

    fn evaluate(&self, params: &SarimaParams) -> Result<Evaluation, EstimatorError> {
        let c = params.constant.unwrap_or(0.0);
        let centered: Vec<f64> = self.differenced.iter().map(|w| w - c).collect();
        let system = ArmaStateSpace::new(
            &params.expanded_ar(self.period),
            &params.expanded_ma(self.period),
        );
        let output = system.filter(&centered)?;
        let log_likelihood = output.concentrated_log_likelihood();
        if !log_likelihood.is_finite() {
            return Err(EstimatorError::Numerical("log-likelihood is not finite".to_string()));
        }
        Ok(Evaluation { log_likelihood, sigma2: output.sigma2(), system, output })
    }

    fn objective(&self, x: &[f64]) -> f64 {
        self.evaluate(&self.params(x))
            .map_or(f64::INFINITY, |e| -e.log_likelihood / self.differenced.len() as f64)
    }

    /// Starting point: OLS autoregression for the AR part, zeros elsewhere.
    fn initial_point(&self) -> Vec<f64> {
        let s = self.spec.effective_seasonal();
        let mut x = Vec::with_capacity(self.spec.n_params());
        if self.spec.include_constant {
            x.push(0.0);
        }
        x.extend(unconstrain_stationary(&self.ar_start()));
        x.extend(std::iter::repeat_n(0.0, s.p + self.spec.order.q + s.q));
        x
    }

    fn ar_start(&self) -> Vec<f64> {
        let p = self.spec.order.p;
        let n = self.differenced.len();
        if p == 0 || n <= 2 * p + 1 {
            return vec![0.0; p];
        }
        let w: Vec<f64> = self.differenced.iter().map(|v| v - self.center).collect();
        let y = Array1::from_iter(w[p..].iter().copied());
        let x = Array2::from_shape_fn((n - p, p), |(t, k)| w[p + t - k - 1]);
        ols(&y, &x).map_or_else(|_| vec![0.0; p], |fit| fit.coefficients.to_vec())
    }
}

struct Evaluation {
    log_likelihood: f64,
    sigma2: f64,
    system: ArmaStateSpace,
    output: FilterOutput,
}

impl SarimaEstimator {
    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &SarimaConfig {
        &self.config
    }

    /// Fit starting the optimiser from `start`, a point in the unconstrained
    /// parametrisation returned by [`SarimaFit::unconstrained_params`].
    ///
    /// # Errors
    /// Returns `EstimatorError` if the series is unusable, `start` has the
    /// wrong length, or the likelihood cannot be evaluated.
    pub fn fit_from(&self, series: &[f64], start: &[f64]) -> Result<SarimaFit, EstimatorError> {
        let spec = self.config.spec;
        if start.len() != spec.n_params() {
            return Err(EstimatorError::InvalidConfig(format!(
                "{spec} has {} parameters, start point has {}",
                spec.n_params(),
                start.len()
            )));
        }
        self.estimate(series, Some(start))
    }

    fn estimate(&self, series: &[f64], start: Option<&[f64]>) -> Result<SarimaFit, EstimatorError> {
        let spec = self.config.spec;
        spec.validate()?;
        if series.iter().any(|v| !v.is_finite()) {
            return Err(EstimatorError::NonFinite);
        }
        if series.len() < spec.min_observations() {
            return Err(EstimatorError::InsufficientData {
                required: spec.min_observations(),
                actual: series.len(),
            });
        }

        let seasonal = spec.effective_seasonal();
        let differenced = seasonal_difference(
            &difference(series, spec.order.d),
            seasonal.period,
            seasonal.d,
        );
        let center = mean(&differenced).map_err(numerical)?;
        let scale = std_dev(&differenced, 0).map_err(numerical)?;
        let problem = Problem {
            spec,
            period: seasonal.period,
            differenced: &differenced,
            center,
            scale: if scale > 1e-12 { scale } else { 1.0 },
        };

        let (x, converged, iterations) = if spec.n_params() == 0 {
            (Vec::new(), true, 0)
        } else {
            let x0 = start.map_or_else(|| problem.initial_point(), <[f64]>::to_vec);
            let minimum = NelderMead::with_config(self.config.optimizer)
                .minimize(|x| problem.objective(x), &x0)
                .map_err(numerical)?;
            (minimum.x, minimum.converged, minimum.iterations)
        };

        let params = problem.params(&x);
        let evaluation = problem.evaluate(&params)?;
        let nobs = differenced.len();
        let k = spec.n_params() + 1;
        let llf = evaluation.log_likelihood;
        let aic = -2.0 * llf + 2.0 * k as f64;
        let bic = -2.0 * llf + k as f64 * (nobs as f64).ln();
        let aicc = if nobs > k + 1 {
            aic + 2.0 * (k * (k + 1)) as f64 / (nobs - k - 1) as f64
        } else {
            f64::INFINITY
        };
        trace!(%spec, llf, iterations, converged, "likelihood maximised");
        if !converged {
            debug!(%spec, iterations, "optimiser stopped before meeting its tolerances");
        }

        let tail_len = spec.differencing_loss().min(series.len());
        Ok(SarimaFit {
            spec,
            params,
            unconstrained: x,
            sigma2: evaluation.sigma2,
            log_likelihood: llf,
            aic,
            aicc,
            bic,
            residuals: evaluation.output.innovations,
            converged,
            n_obs: series.len(),
            n_effective: nobs,
            tail: series[series.len() - tail_len..].to_vec(),
            next_state: evaluation.output.next_state,
            system: evaluation.system,
        })
    }
}

fn numerical(err: impl fmt::Display) -> EstimatorError {
    EstimatorError::Numerical(err.to_string())
}

impl ModelEstimator for SarimaEstimator {
    type Config = SarimaConfig;
    type Fitted = SarimaFit;

    fn with_config(config: Self::Config) -> Self {
        Self { config }
    }

    fn fit(&self, series: &[f64]) -> Result<Self::Fitted, EstimatorError> {
        self.estimate(series, None)
    }
}

/// A fitted SARIMA model.
#[derive(Debug, Clone)]
pub struct SarimaFit {
    spec: SarimaSpec,
    params: SarimaParams,
    unconstrained: Vec<f64>,
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    aicc: f64,
    bic: f64,
    residuals: Vec<f64>,
    converged: bool,
    n_obs: usize,
    n_effective: usize,
    tail: Vec<f64>,
    next_state: Vec<f64>,
    system: ArmaStateSpace,
}

impl SarimaFit {
    /// Model orders.
    #[must_use]
    pub const fn spec(&self) -> &SarimaSpec {
        &self.spec
    }

    /// Estimated coefficients.
    #[must_use]
    pub const fn params(&self) -> &SarimaParams {
        &self.params
    }

    /// Optimum in the unconstrained parametrisation, usable as a warm start
    /// for [`SarimaEstimator::fit_from`].
    #[must_use]
    pub fn unconstrained_params(&self) -> &[f64] {
        &self.unconstrained
    }

    /// Innovation variance.
    #[must_use]
    pub const fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Maximised log-likelihood of the differenced series.
    #[must_use]
    pub const fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion.
    #[must_use]
    pub const fn aic(&self) -> f64 {
        self.aic
    }

    /// Corrected AIC.
    #[must_use]
    pub const fn aicc(&self) -> f64 {
        self.aicc
    }

    /// Bayesian information criterion.
    #[must_use]
    pub const fn bic(&self) -> f64 {
        self.bic
    }

    /// Value of the requested criterion.
    #[must_use]
    pub const fn criterion(&self, criterion: InformationCriterion) -> f64 {
        match criterion {
            InformationCriterion::Aic => self.aic,
            InformationCriterion::Aicc => self.aicc,
            InformationCriterion::Bic => self.bic,
        }
    }

    /// One-step-ahead prediction errors on the differenced series.
    #[must_use]
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Whether the optimiser met its tolerances.
    #[must_use]
    pub const fn converged(&self) -> bool {
        self.converged
    }

    /// Observations left after differencing.
    #[must_use]
    pub const fn n_effective(&self) -> usize {
        self.n_effective
    }
}

impl Forecaster for SarimaFit {
    fn forecast(&self, steps: usize, alpha: f64) -> Result<ForecastPath, EstimatorError> {
        let z = norm_ppf(1.0 - alpha / 2.0).map_err(|_| {
            EstimatorError::InvalidConfig(format!("alpha must be in (0, 1), got {alpha}"))
        })?;

        let c = self.params.constant.unwrap_or(0.0);
        let differenced: Vec<f64> =
            self.system.project(&self.next_state, steps).iter().map(|w| w + c).collect();

        // Undo differencing: y_t = w_t - Σ_{i>=1} δ_i y_{t-i}.
        let delta = self.spec.differencing_polynomial();
        let mut levels = self.tail.clone();
        for w in &differenced {
            let t = levels.len();
            let lagged: f64 = (1..delta.len()).map(|i| delta[i] * levels[t - i]).sum();
            levels.push(w - lagged);
        }
        let mean = levels.split_off(self.tail.len());

        let period = self.spec.effective_seasonal().period;
        let ar_full: Vec<f64> = {
            let stationary = self.params.expanded_ar(period);
            let mut poly = vec![1.0];
            poly.extend(stationary.iter().map(|a| -a));
            multiply(&poly, &delta)[1..].iter().map(|a| -a).collect()
        };
        let psi = psi_weights(&ar_full, &self.params.expanded_ma(period), steps);

        let mut cumulative = 0.0;
        let mut lower = Vec::with_capacity(steps);
        let mut upper = Vec::with_capacity(steps);
        for (m, weight) in mean.iter().zip(&psi) {
            cumulative += weight * weight;
            let half_width = z * (self.sigma2 * cumulative).sqrt();
            lower.push(m - half_width);
            upper.push(m + half_width);
        }

        Ok(ForecastPath { mean, lower, upper, alpha })
    }

    fn n_obs(&self) -> usize {
        self.n_obs
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, StandardNormal};
    use rstest::rstest;
    use stockcast_primitives::{ArimaOrder, SeasonalOrder};

    use super::*;

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| -> f64 { StandardNormal.sample(&mut rng) }).collect()
    }

    fn ar1(n: usize, phi: f64, mean: f64, seed: u64) -> Vec<f64> {
        let e = noise(n, seed);
        let mut x = vec![0.0; n];
        for t in 1..n {
            x[t] = phi * x[t - 1] + e[t];
        }
        x.iter().map(|v| v + mean).collect()
    }

    fn fit(series: &[f64], spec: SarimaSpec) -> SarimaFit {
        SarimaEstimator::with_config(SarimaConfig::for_spec(spec)).fit(series).unwrap()
    }

    #[test]
    fn recovers_ar1_coefficient() {
        let series = ar1(600, 0.6, 5.0, 7);
        let model = fit(&series, SarimaSpec::non_seasonal(ArimaOrder::new(1, 0, 0), true));
        assert_relative_eq!(model.params().ar[0], 0.6, epsilon = 0.1);
        assert_relative_eq!(model.params().constant.unwrap(), 5.0, epsilon = 0.3);
        assert_relative_eq!(model.sigma2(), 1.0, epsilon = 0.15);
        assert_eq!(model.residuals().len(), 600);
    }

    #[test]
    fn recovers_ma1_coefficient() {
        let e = noise(800, 11);
        let series: Vec<f64> = (1..e.len()).map(|t| e[t] + 0.5 * e[t - 1]).collect();
        let model = fit(&series, SarimaSpec::non_seasonal(ArimaOrder::new(0, 0, 1), false));
        assert_relative_eq!(model.params().ma[0], 0.5, epsilon = 0.1);
    }

    #[test]
    fn information_criteria_are_consistent() {
        let series = ar1(200, 0.3, 0.0, 3);
        let model = fit(&series, SarimaSpec::non_seasonal(ArimaOrder::new(1, 0, 0), true));
        let k = 3.0;
        let n = 200.0;
        assert_relative_eq!(model.aic(), -2.0 * model.log_likelihood() + 2.0 * k);
        assert_relative_eq!(model.bic(), -2.0 * model.log_likelihood() + k * f64::ln(n));
        assert!(model.aicc() > model.aic());
        assert_eq!(model.criterion(InformationCriterion::Bic), model.bic());
    }

    #[test]
    fn random_walk_forecast_is_flat_with_widening_bands() {
        let e = noise(300, 5);
        let series: Vec<f64> = e
            .iter()
            .scan(100.0, |level, step| {
                *level += step;
                Some(*level)
            })
            .collect();
        let model = fit(&series, SarimaSpec::non_seasonal(ArimaOrder::new(0, 1, 0), false));
        let path = model.forecast(10, 0.05).unwrap();
        let last = series[series.len() - 1];
        assert_eq!(path.len(), 10);
        for h in 0..10 {
            assert_relative_eq!(path.mean[h], last, epsilon = 1e-9);
            let width = path.upper[h] - path.lower[h];
            let expected = 2.0 * 1.959_963_984_540_054 * (model.sigma2() * (h + 1) as f64).sqrt();
            assert_relative_eq!(width, expected, epsilon = 1e-6);
        }
    }

    #[test]
    fn seasonal_model_forecasts_the_pattern() {
        let pattern = [3.0, -1.0, 0.5, -2.5];
        let e = noise(160, 17);
        let series: Vec<f64> = (0..160).map(|t| 50.0 + pattern[t % 4] + 0.1 * e[t]).collect();
        let spec = SarimaSpec::new(ArimaOrder::new(0, 0, 0), SeasonalOrder::new(0, 1, 0, 4), false);
        let path = fit(&series, spec).forecast(8, 0.05).unwrap();
        for (h, m) in path.mean.iter().enumerate() {
            assert_relative_eq!(*m, 50.0 + pattern[(160 + h) % 4], epsilon = 0.5);
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(f64::NAN)]
    fn rejects_invalid_alpha(#[case] alpha: f64) {
        let model = fit(&ar1(100, 0.2, 0.0, 1), SarimaSpec::default());
        assert!(matches!(model.forecast(3, alpha), Err(EstimatorError::InvalidConfig(_))));
    }

    #[test]
    fn rejects_short_and_non_finite_series() {
        let estimator = SarimaEstimator::with_config(SarimaConfig::for_spec(
            SarimaSpec::non_seasonal(ArimaOrder::new(2, 1, 2), true),
        ));
        assert!(matches!(
            estimator.fit(&[1.0, 2.0, 3.0]),
            Err(EstimatorError::InsufficientData { required: 9, actual: 3 })
        ));
        let mut series = ar1(50, 0.2, 0.0, 2);
        series[10] = f64::NAN;
        assert!(matches!(estimator.fit(&series), Err(EstimatorError::NonFinite)));
    }

    #[test]
    fn warm_start_reaches_the_same_optimum() {
        let series = ar1(300, 0.5, 1.0, 9);
        let spec = SarimaSpec::non_seasonal(ArimaOrder::new(1, 0, 1), true);
        let estimator = SarimaEstimator::with_config(SarimaConfig::for_spec(spec));
        let cold = estimator.fit(&series).unwrap();
        let warm = estimator.fit_from(&series, cold.unconstrained_params()).unwrap();
        assert_relative_eq!(warm.log_likelihood(), cold.log_likelihood(), epsilon = 1e-3);
        assert!(estimator.fit_from(&series, &[0.0]).is_err());
    }
}
