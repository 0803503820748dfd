//! Unit-root and stationarity tests.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use stockcast_math::{norm_cdf, ols};
use tracing::info;

use crate::StatsError;

/// MacKinnon (1994) p-value polynomial for the constant-only ADF regression,
/// used when the statistic is at or below `TAU_STAR`.
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
/// Same, above `TAU_STAR`.
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;

/// MacKinnon (2010) response-surface coefficients for the 1%, 5% and 10%
/// critical values, constant-only regression.
const TAU_CRIT: [[f64; 4]; 3] = [
    [-3.43035, -6.5393, -16.786, -79.433],
    [-2.86154, -2.8903, -4.234, -40.040],
    [-2.56677, -1.5384, -2.809, 0.0],
];

/// KPSS level-stationarity critical values and their tail probabilities.
const KPSS_CRIT: [f64; 4] = [0.347, 0.463, 0.574, 0.739];
const KPSS_PVALUES: [f64; 4] = [0.10, 0.05, 0.025, 0.01];

/// Options of the Augmented Dickey-Fuller test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdfConfig {
    /// Largest number of lagged differences; `None` uses `ceil(12 (n/100)^(1/4))`.
    pub max_lag: Option<usize>,
    /// Pick the lag count in `0..=max_lag` minimising AIC; otherwise use `max_lag`.
    pub autolag: bool,
    /// Significance level of the logged verdict.
    pub significance: f64,
}

impl Default for AdfConfig {
    fn default() -> Self {
        Self { max_lag: None, autolag: true, significance: 0.05 }
    }
}

/// Critical values of a test statistic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    /// 1% level.
    pub one_percent: f64,
    /// 5% level.
    pub five_percent: f64,
    /// 10% level.
    pub ten_percent: f64,
}

/// Outcome of an Augmented Dickey-Fuller test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    /// Label of the tested series.
    pub title: String,
    /// t-statistic of the lagged level.
    pub statistic: f64,
    /// MacKinnon approximate p-value.
    pub p_value: f64,
    /// Number of lagged differences in the final regression.
    pub used_lag: usize,
    /// Observations in the final regression.
    pub n_obs: usize,
    /// Finite-sample critical values.
    pub critical_values: CriticalValues,
    /// Best AIC of the lag search, when one was run.
    pub ic_best: Option<f64>,
}

impl AdfResult {
    /// Whether the unit-root null is rejected, i.e. the p-value lies strictly
    /// below `significance`.
    #[must_use]
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

/// Augmented Dickey-Fuller test with a constant and AIC lag selection.
///
/// # Errors
/// See [`adf_test_with`].
pub fn adf_test(values: &[f64], title: &str) -> Result<AdfResult, StatsError> {
    adf_test_with(values, title, &AdfConfig::default())
}

/// Augmented Dickey-Fuller test of `values` against a unit root.
///
/// Regresses `Δx_t` on a constant, `x_{t-1}` and `k` lagged differences.
/// With `autolag`, every `k` up to the maximum lag is fitted on a common
/// sample and the AIC minimiser is re-estimated on its full sample. NaN and
/// infinite values are dropped first.
///
/// The verdict at `config.significance` is logged; the result is returned
/// either way.
///
/// # Errors
/// Returns error if too few finite observations remain for the requested
/// lag or a regression is singular.
pub fn adf_test_with(
    values: &[f64],
    title: &str,
    config: &AdfConfig,
) -> Result<AdfResult, StatsError> {
    let x: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = x.len();
    if n < 6 {
        return Err(StatsError::InsufficientData { required: 6, actual: n });
    }

    let cap = n / 2 - 2;
    let max_lag = match config.max_lag {
        Some(lag) if lag > cap => {
            return Err(StatsError::InvalidConfig(format!(
                "max lag {lag} exceeds {cap} for {n} observations"
            )));
        }
        Some(lag) => lag,
        None => ((12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize).min(cap),
    };

    let dx: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

    let (used_lag, ic_best) = if config.autolag {
        let mut best: Option<(f64, usize)> = None;
        for lag in 0..=max_lag {
            let (y, design) = adf_design(&x, &dx, lag, max_lag);
            let aic = ols(&y, &design)?.aic();
            if best.is_none_or(|(b, _)| aic < b) {
                best = Some((aic, lag));
            }
        }
        match best {
            Some((aic, lag)) => (lag, Some(aic)),
            None => (max_lag, None),
        }
    } else {
        (max_lag, None)
    };

    let (y, design) = adf_design(&x, &dx, used_lag, used_lag);
    let fit = ols(&y, &design)?;
    let statistic = fit.t_value(0);
    let n_obs = fit.nobs;

    let result = AdfResult {
        title: title.to_string(),
        statistic,
        p_value: mackinnon_p_value(statistic)?,
        used_lag,
        n_obs,
        critical_values: adf_critical_values(n_obs),
        ic_best,
    };

    let verdict = if result.is_stationary(config.significance) {
        "reject the unit-root null; series looks stationary"
    } else {
        "fail to reject the unit-root null; series looks non-stationary"
    };
    info!(
        title,
        statistic = result.statistic,
        p_value = result.p_value,
        used_lag = result.used_lag,
        n_obs = result.n_obs,
        "ADF test: {verdict}"
    );
    Ok(result)
}

/// Regression of `Δx_t` on `[x_{t-1}, Δx_{t-1}, ..., Δx_{t-lag}, 1]`, using
/// the rows available after dropping `skip` leading differences.
fn adf_design(x: &[f64], dx: &[f64], lag: usize, skip: usize) -> (Array1<f64>, Array2<f64>) {
    let rows: Vec<usize> = (skip..dx.len()).collect();
    let y = Array1::from_iter(rows.iter().map(|&t| dx[t]));
    let mut design = Array2::zeros((rows.len(), lag + 2));
    for (i, &t) in rows.iter().enumerate() {
        design[[i, 0]] = x[t];
        for k in 1..=lag {
            design[[i, k]] = dx[t - k];
        }
        design[[i, lag + 1]] = 1.0;
    }
    (y, design)
}

/// Approximate p-value of an ADF statistic (constant, one variable).
///
/// # Errors
/// Returns error only if the normal distribution cannot be evaluated.
pub fn mackinnon_p_value(statistic: f64) -> Result<f64, StatsError> {
    if statistic > TAU_MAX {
        return Ok(1.0);
    }
    if statistic < TAU_MIN {
        return Ok(0.0);
    }
    let poly: f64 = if statistic <= TAU_STAR {
        TAU_SMALL_P.iter().rev().fold(0.0, |acc, c| acc * statistic + c)
    } else {
        TAU_LARGE_P.iter().rev().fold(0.0, |acc, c| acc * statistic + c)
    };
    Ok(norm_cdf(poly)?)
}

fn adf_critical_values(n_obs: usize) -> CriticalValues {
    let inv = 1.0 / n_obs as f64;
    let eval = |c: &[f64; 4]| c[0] + c[1] * inv + c[2] * inv.powi(2) + c[3] * inv.powi(3);
    CriticalValues {
        one_percent: eval(&TAU_CRIT[0]),
        five_percent: eval(&TAU_CRIT[1]),
        ten_percent: eval(&TAU_CRIT[2]),
    }
}

/// Outcome of a KPSS level-stationarity test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KpssResult {
    /// KPSS statistic.
    pub statistic: f64,
    /// Interpolated p-value, clipped to [0.01, 0.10].
    pub p_value: f64,
    /// Bartlett window length of the long-run variance.
    pub lags: usize,
}

impl KpssResult {
    /// Whether stationarity is retained at `alpha`.
    #[must_use]
    pub fn is_stationary(&self, alpha: f64) -> bool {
        self.p_value >= alpha
    }
}

/// KPSS test of level stationarity.
///
/// The null hypothesis is stationarity, so small p-values suggest
/// differencing. The long-run variance uses a Bartlett kernel with
/// `lags` (default `trunc(3 sqrt(n) / 13)`). A constant series has
/// statistic 0.
///
/// # Errors
/// Returns error if fewer than three finite values are given.
pub fn kpss_test(values: &[f64], lags: Option<usize>) -> Result<KpssResult, StatsError> {
    let x: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let n = x.len();
    if n < 3 {
        return Err(StatsError::InsufficientData { required: 3, actual: n });
    }
    let nf = n as f64;
    let lags = lags.unwrap_or_else(|| (3.0 * nf.sqrt() / 13.0) as usize).min(n - 1);

    let mu = x.iter().sum::<f64>() / nf;
    let e: Vec<f64> = x.iter().map(|v| v - mu).collect();

    let mut partial = 0.0;
    let mut eta = 0.0;
    for v in &e {
        partial += v;
        eta += partial * partial;
    }
    eta /= nf * nf;

    let mut s2 = e.iter().map(|v| v * v).sum::<f64>() / nf;
    for l in 1..=lags {
        let w = 1.0 - l as f64 / (lags as f64 + 1.0);
        let cov: f64 = (l..n).map(|t| e[t] * e[t - l]).sum();
        s2 += 2.0 * w * cov / nf;
    }

    let statistic = if s2 > 0.0 { eta / s2 } else { 0.0 };
    Ok(KpssResult { statistic, p_value: kpss_p_value(statistic), lags })
}

fn kpss_p_value(statistic: f64) -> f64 {
    if statistic <= KPSS_CRIT[0] {
        return KPSS_PVALUES[0];
    }
    for i in 1..KPSS_CRIT.len() {
        if statistic <= KPSS_CRIT[i] {
            let t = (statistic - KPSS_CRIT[i - 1]) / (KPSS_CRIT[i] - KPSS_CRIT[i - 1]);
            return KPSS_PVALUES[i - 1] + t * (KPSS_PVALUES[i] - KPSS_PVALUES[i - 1]);
        }
    }
    KPSS_PVALUES[KPSS_PVALUES.len() - 1]
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, StandardNormal};

    use super::*;

    fn white_noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n).map(|_| -> f64 { StandardNormal.sample(&mut rng) }).collect()
    }

    #[test]
    fn mackinnon_reference_values() {
        // Φ(2.1659 - 3·1.4412 + 9·0.038269)
        let expected = norm_cdf(2.1659 - 3.0 * 1.4412 + 9.0 * 0.038269).unwrap();
        assert_relative_eq!(mackinnon_p_value(-3.0).unwrap(), expected, epsilon = 1e-12);
        assert_relative_eq!(mackinnon_p_value(-3.0).unwrap(), 0.0349, epsilon = 5e-4);
        assert_eq!(mackinnon_p_value(3.0).unwrap(), 1.0);
        assert_eq!(mackinnon_p_value(-20.0).unwrap(), 0.0);
    }

    #[test]
    fn critical_values_approach_asymptotic() {
        let cv = adf_critical_values(1_000_000);
        assert_relative_eq!(cv.one_percent, -3.43035, epsilon = 1e-4);
        assert_relative_eq!(cv.five_percent, -2.86154, epsilon = 1e-4);
        assert_relative_eq!(cv.ten_percent, -2.56677, epsilon = 1e-4);

        let small = adf_critical_values(100);
        assert!(small.one_percent < cv.one_percent);
    }

    #[test]
    fn white_noise_is_stationary() {
        let result = adf_test(&white_noise(500, 7), "noise").unwrap();
        assert!(result.p_value < 0.01);
        assert!(result.statistic < result.critical_values.one_percent);
        assert!(result.ic_best.is_some());
        assert_eq!(result.n_obs, 500 - 1 - result.used_lag);
    }

    #[test]
    fn verdict_requires_p_value_below_significance() {
        let mut result = adf_test(&white_noise(200, 5), "noise").unwrap();
        result.p_value = 0.05;
        assert!(!result.is_stationary(0.05));
        result.p_value = 0.0499;
        assert!(result.is_stationary(0.05));
    }

    #[test]
    fn fixed_lag_without_search() {
        let config = AdfConfig { max_lag: Some(3), autolag: false, ..Default::default() };
        let result = adf_test_with(&white_noise(120, 3), "fixed", &config).unwrap();
        assert_eq!(result.used_lag, 3);
        assert_eq!(result.n_obs, 120 - 1 - 3);
        assert!(result.ic_best.is_none());
    }

    #[test]
    fn nan_values_are_dropped() {
        let mut x = white_noise(200, 11);
        x[10] = f64::NAN;
        let result = adf_test(&x, "gappy").unwrap();
        assert_eq!(result.n_obs, 199 - 1 - result.used_lag);
    }

    #[test]
    fn adf_rejects_excessive_lag() {
        let config = AdfConfig { max_lag: Some(50), ..Default::default() };
        assert!(adf_test_with(&white_noise(40, 1), "short", &config).is_err());
        assert!(adf_test(&[1.0, 2.0, 3.0], "tiny").is_err());
    }

    #[test]
    fn kpss_flags_trend() {
        let trend: Vec<f64> = (0..200).map(f64::from).collect();
        let result = kpss_test(&trend, None).unwrap();
        assert_eq!(result.p_value, 0.01);
        assert!(!result.is_stationary(0.05));
    }

    #[test]
    fn kpss_accepts_bounded_oscillation() {
        let wave: Vec<f64> = (0..300).map(|t| (0.5 * f64::from(t)).sin()).collect();
        let result = kpss_test(&wave, None).unwrap();
        assert!(result.is_stationary(0.05));
        assert_eq!(result.lags, (3.0 * 300f64.sqrt() / 13.0) as usize);
    }

    #[test]
    fn kpss_interpolates_between_table_values() {
        assert_relative_eq!(kpss_p_value(0.405), 0.075, epsilon = 1e-12);
        assert_eq!(kpss_p_value(0.1), 0.10);
        assert_eq!(kpss_p_value(2.0), 0.01);
        assert_eq!(kpss_test(&[5.0; 20], None).unwrap().statistic, 0.0);
    }
}
