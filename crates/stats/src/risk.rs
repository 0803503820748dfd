//! Value-at-Risk and Sharpe ratio.
//!
//! VaR is reported as a positive number meaning "loss": a 5% one-day VaR of
//! 0.02 says that on one day in twenty the return is expected to be worse
//! than -2%. Multi-day VaR follows the square-root-of-time rule.

use std::{fmt, str::FromStr};

use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use stockcast_math::{mean, norm_ppf, quantile, std_dev};
use tracing::{info, warn};

use crate::StatsError;

/// Default number of Monte-Carlo draws.
const DEFAULT_DRAWS: usize = 100_000;

/// Default Monte-Carlo seed.
const DEFAULT_SEED: u64 = 42;

/// Volatility below which the Sharpe ratio is undefined.
const MIN_VOLATILITY: f64 = 1e-12;

/// How the α-quantile of the return distribution is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarMethod {
    /// Empirical quantile of the observed returns.
    Historical,
    /// Gaussian quantile from the sample mean and standard deviation.
    Parametric,
    /// Gaussian model with the standard-normal quantile estimated from
    /// seeded simulation draws.
    MonteCarlo {
        /// Number of simulated draws.
        draws: usize,
        /// Random seed.
        seed: u64,
    },
}

impl VarMethod {
    /// Monte-Carlo method with the default draw count and seed.
    #[must_use]
    pub const fn monte_carlo() -> Self {
        Self::MonteCarlo { draws: DEFAULT_DRAWS, seed: DEFAULT_SEED }
    }
}

impl fmt::Display for VarMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Historical => f.write_str("historical"),
            Self::Parametric => f.write_str("parametric"),
            Self::MonteCarlo { .. } => f.write_str("monte_carlo"),
        }
    }
}

impl FromStr for VarMethod {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "historical" => Ok(Self::Historical),
            "parametric" | "gaussian" => Ok(Self::Parametric),
            "monte_carlo" | "monte-carlo" | "montecarlo" => Ok(Self::monte_carlo()),
            other => Err(StatsError::UnknownVarMethod(other.to_string())),
        }
    }
}

/// Value-at-Risk of `returns` at tail probability `alpha`.
///
/// # Arguments
/// * `returns` - Periodic returns; NaN values are ignored
/// * `alpha` - Tail probability, 0.05 for 95% VaR
/// * `method` - Quantile estimator
/// * `horizon_days` - Holding period; the one-day figure is scaled by its square root
///
/// # Returns
/// The loss threshold as a positive number (negative when even the tail
/// quantile is a gain).
///
/// # Errors
/// Returns error if `alpha` is outside (0, 1), `horizon_days` is zero, or
/// there are too few finite returns.
pub fn compute_var(
    returns: &[f64],
    alpha: f64,
    method: VarMethod,
    horizon_days: usize,
) -> Result<f64, StatsError> {
    if alpha.is_nan() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(StatsError::InvalidConfig(format!("alpha must be in (0, 1), got {alpha}")));
    }
    if horizon_days == 0 {
        return Err(StatsError::InvalidConfig("horizon must be at least one day".to_string()));
    }
    let values: Vec<f64> = returns.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Err(StatsError::InsufficientData { required: 1, actual: 0 });
    }

    let one_day = match method {
        VarMethod::Historical => -quantile(&values, alpha)?,
        VarMethod::Parametric => {
            let (mu, sigma) = location_scale(&values)?;
            -(mu + sigma * norm_ppf(alpha)?)
        }
        VarMethod::MonteCarlo { draws, seed } => {
            if draws == 0 {
                return Err(StatsError::InvalidConfig("Monte-Carlo draws must be positive".to_string()));
            }
            let (mu, sigma) = location_scale(&values)?;
            let mut rng = StdRng::seed_from_u64(seed);
            let sample: Vec<f64> =
                (0..draws).map(|_| -> f64 { StandardNormal.sample(&mut rng) }).collect();
            -(mu + sigma * quantile(&sample, alpha)?)
        }
    };

    Ok(one_day * (horizon_days as f64).sqrt())
}

fn location_scale(values: &[f64]) -> Result<(f64, f64), StatsError> {
    if values.len() < 2 {
        return Err(StatsError::InsufficientData { required: 2, actual: values.len() });
    }
    Ok((mean(values)?, std_dev(values, 1)?))
}

/// Annualised Sharpe ratio of periodic `returns`.
///
/// The annual risk-free rate is converted to a per-period rate by
/// compounding, `(1 + rf)^(1 / periods_per_year) - 1`. Excess mean and
/// volatility are annualised by `periods_per_year` and its square root.
///
/// Zero volatility, or fewer than two returns, yields NaN.
///
/// # Errors
/// Returns error if `periods_per_year` is zero or `returns` has no finite values.
pub fn compute_sharpe(
    returns: &[f64],
    risk_free_rate: f64,
    periods_per_year: usize,
) -> Result<f64, StatsError> {
    if periods_per_year == 0 {
        return Err(StatsError::InvalidConfig("periods per year must be positive".to_string()));
    }
    let values: Vec<f64> = returns.iter().copied().filter(|v| v.is_finite()).collect();
    if values.is_empty() {
        return Err(StatsError::InsufficientData { required: 1, actual: 0 });
    }
    if values.len() < 2 {
        return Ok(f64::NAN);
    }

    let ppy = periods_per_year as f64;
    let rf_period = (1.0 + risk_free_rate).powf(1.0 / ppy) - 1.0;
    let excess = mean(&values)? - rf_period;
    let vol = std_dev(&values, 1)? * ppy.sqrt();
    if vol < MIN_VOLATILITY {
        return Ok(f64::NAN);
    }
    Ok(excess * ppy / vol)
}

/// Parameters of a combined risk report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Tail probability.
    pub alpha: f64,
    /// Holding period in days.
    pub horizon_days: usize,
    /// Annual risk-free rate.
    pub risk_free_rate: f64,
    /// Return observations per year.
    pub periods_per_year: usize,
    /// Draws for the Monte-Carlo estimate.
    pub monte_carlo_draws: usize,
    /// Seed for the Monte-Carlo estimate.
    pub seed: u64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            horizon_days: 1,
            risk_free_rate: 0.02,
            periods_per_year: 252,
            monte_carlo_draws: DEFAULT_DRAWS,
            seed: DEFAULT_SEED,
        }
    }
}

impl RiskConfig {
    /// Configuration at a confidence level such as 0.95 (α = 1 - level).
    ///
    /// # Errors
    /// Returns error if `level` is outside (0, 1).
    pub fn from_confidence(level: f64) -> Result<Self, StatsError> {
        if level.is_nan() || level <= 0.0 || level >= 1.0 {
            return Err(StatsError::InvalidConfig(format!(
                "confidence level must be in (0, 1), got {level}"
            )));
        }
        Ok(Self { alpha: 1.0 - level, ..Self::default() })
    }
}

/// VaR under every method plus the Sharpe ratio, all from one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    /// Tail probability used.
    pub alpha: f64,
    /// Holding period in days.
    pub horizon_days: usize,
    /// Historical VaR.
    pub historical_var: f64,
    /// Parametric VaR.
    pub parametric_var: f64,
    /// Monte-Carlo VaR.
    pub monte_carlo_var: f64,
    /// Annualised Sharpe ratio.
    pub sharpe_ratio: f64,
}

/// Compute a [`RiskReport`] for `returns`.
///
/// # Errors
/// Returns the first error raised by [`compute_var`] or [`compute_sharpe`].
pub fn risk_report(returns: &[f64], config: &RiskConfig) -> Result<RiskReport, StatsError> {
    let var = |method| compute_var(returns, config.alpha, method, config.horizon_days);
    let report = RiskReport {
        alpha: config.alpha,
        horizon_days: config.horizon_days,
        historical_var: var(VarMethod::Historical)?,
        parametric_var: var(VarMethod::Parametric)?,
        monte_carlo_var: var(VarMethod::MonteCarlo {
            draws: config.monte_carlo_draws,
            seed: config.seed,
        })?,
        sharpe_ratio: compute_sharpe(returns, config.risk_free_rate, config.periods_per_year)?,
    };

    if report.sharpe_ratio.is_nan() {
        warn!("Sharpe ratio undefined: return volatility is zero");
    }
    info!(
        alpha = report.alpha,
        horizon = report.horizon_days,
        historical = report.historical_var,
        parametric = report.parametric_var,
        monte_carlo = report.monte_carlo_var,
        sharpe = report.sharpe_ratio,
        "risk report"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    const RETURNS: [f64; 5] = [-0.05, -0.01, 0.0, 0.02, 0.05];

    #[test]
    fn historical_var_is_negated_percentile() {
        let var = compute_var(&RETURNS, 0.05, VarMethod::Historical, 1).unwrap();
        assert_relative_eq!(var, 0.042, epsilon = 1e-12);
    }

    #[test]
    fn parametric_var() {
        let mu = 0.002;
        let sigma = std_dev(&RETURNS, 1).unwrap();
        let expected = -(mu + sigma * -1.644_853_626_951_472_2);
        let var = compute_var(&RETURNS, 0.05, VarMethod::Parametric, 1).unwrap();
        assert_relative_eq!(var, expected, epsilon = 1e-8);
    }

    #[test]
    fn horizon_scaling() {
        let one = compute_var(&RETURNS, 0.05, VarMethod::Historical, 1).unwrap();
        let ten = compute_var(&RETURNS, 0.05, VarMethod::Historical, 10).unwrap();
        assert_relative_eq!(ten, one * 10f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn monte_carlo_tracks_parametric() {
        let parametric = compute_var(&RETURNS, 0.05, VarMethod::Parametric, 1).unwrap();
        let mc = compute_var(&RETURNS, 0.05, VarMethod::monte_carlo(), 1).unwrap();
        assert_relative_eq!(mc, parametric, max_relative = 0.02);

        let again = compute_var(&RETURNS, 0.05, VarMethod::monte_carlo(), 1).unwrap();
        assert_eq!(mc, again);
    }

    #[rstest]
    #[case("historical", VarMethod::Historical)]
    #[case("Parametric", VarMethod::Parametric)]
    #[case("monte_carlo", VarMethod::monte_carlo())]
    fn parse_method(#[case] name: &str, #[case] expected: VarMethod) {
        assert_eq!(name.parse::<VarMethod>().unwrap(), expected);
    }

    #[test]
    fn unknown_method_is_config_error() {
        let err = "cornish-fisher".parse::<VarMethod>().unwrap_err();
        assert!(err.is_config_error());
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(f64::NAN)]
    fn invalid_alpha(#[case] alpha: f64) {
        assert!(compute_var(&RETURNS, alpha, VarMethod::Historical, 1).is_err());
    }

    #[test]
    fn sharpe_of_constant_returns_is_nan() {
        let sharpe = compute_sharpe(&[0.001; 30], 0.02, 252).unwrap();
        assert!(sharpe.is_nan());
    }

    #[test]
    fn sharpe_uses_compounded_daily_rate() {
        let returns = [0.01, -0.005, 0.007, 0.002, -0.001];
        let rf = (1.02f64).powf(1.0 / 252.0) - 1.0;
        let mu = mean(&returns).unwrap();
        let sd = std_dev(&returns, 1).unwrap();
        let expected = (mu - rf) * 252.0 / (sd * 252f64.sqrt());
        assert_relative_eq!(compute_sharpe(&returns, 0.02, 252).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn report_uses_single_sign_convention() {
        let config = RiskConfig::from_confidence(0.95).unwrap();
        assert_relative_eq!(config.alpha, 0.05, epsilon = 1e-12);

        let returns: Vec<f64> = (0..250).map(|i| ((i * 37 % 101) as f64 - 50.0) / 2_000.0).collect();
        let report = risk_report(&returns, &config).unwrap();
        assert!(report.historical_var > 0.0);
        assert!(report.parametric_var > 0.0);
        assert!(report.monte_carlo_var > 0.0);
    }
}
