//! Kalman filter for a stationary ARMA process in Harvey's state-space form.
//!
//! With `r = max(p, q + 1)` the state evolves as `α_{t+1} = T α_t + R ε_t`
//! where `T` carries the AR coefficients in its first column and ones on the
//! superdiagonal, `R = (1, θ_1, ..., θ_{r-1})'` and the observation is the
//! first state element. The filter runs with unit innovation variance so
//! that the variance can be concentrated out of the likelihood.

use ndarray::Array2;
use stockcast_traits::EstimatorError;

const DOUBLING_ITERATIONS: usize = 64;
const DOUBLING_TOLERANCE: f64 = 1e-12;

/// ARMA(p, q) system matrices.
#[derive(Debug, Clone)]
pub(crate) struct ArmaStateSpace {
    phi: Vec<f64>,
    selection: Vec<f64>,
}

/// Output of a filtering pass.
#[derive(Debug, Clone)]
pub(crate) struct FilterOutput {
    /// One-step-ahead prediction errors.
    pub(crate) innovations: Vec<f64>,
    /// Their variances in units of the innovation variance.
    pub(crate) variances: Vec<f64>,
    /// Predicted state for the first period after the sample.
    pub(crate) next_state: Vec<f64>,
}

impl FilterOutput {
    /// Concentrated innovation variance `Σ v² / F / n`.
    pub(crate) fn sigma2(&self) -> f64 {
        let n = self.innovations.len() as f64;
        self.innovations.iter().zip(&self.variances).map(|(v, f)| v * v / f).sum::<f64>() / n
    }

    /// Gaussian log-likelihood with the innovation variance concentrated out.
    pub(crate) fn concentrated_log_likelihood(&self) -> f64 {
        let n = self.innovations.len() as f64;
        let sigma2 = self.sigma2();
        let log_det: f64 = self.variances.iter().map(|f| f.ln()).sum();
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + sigma2.ln() + 1.0) - 0.5 * log_det
    }
}

impl ArmaStateSpace {
    pub(crate) fn new(ar: &[f64], ma: &[f64]) -> Self {
        let r = ar.len().max(ma.len() + 1);
        let mut phi = vec![0.0; r];
        phi[..ar.len()].copy_from_slice(ar);
        let mut selection = vec![0.0; r];
        selection[0] = 1.0;
        selection[1..=ma.len()].copy_from_slice(ma);
        Self { phi, selection }
    }

    pub(crate) fn dim(&self) -> usize {
        self.phi.len()
    }

    fn transition(&self) -> Array2<f64> {
        let r = self.dim();
        let mut t = Array2::zeros((r, r));
        for i in 0..r {
            t[[i, 0]] = self.phi[i];
            if i + 1 < r {
                t[[i, i + 1]] = 1.0;
            }
        }
        t
    }

    /// Unconditional state covariance, solving `P = T P T' + R R'` by doubling.
    pub(crate) fn stationary_covariance(&self) -> Result<Array2<f64>, EstimatorError> {
        let r = self.dim();
        let mut p = Array2::from_shape_fn((r, r), |(i, j)| self.selection[i] * self.selection[j]);
        let mut a = self.transition();
        for _ in 0..DOUBLING_ITERATIONS {
            let step = a.dot(&p).dot(&a.t());
            p = &p + &step;
            a = a.dot(&a);
            let size = step.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
            if !size.is_finite() {
                break;
            }
            if size < DOUBLING_TOLERANCE {
                return Ok(p);
            }
        }
        Err(EstimatorError::Numerical(
            "state covariance did not converge; AR part is not stationary".to_string(),
        ))
    }

    /// Filter `observations`, which must already have their mean removed.
    ///
    /// # Errors
    /// Returns `EstimatorError::Numerical` if the initial covariance does not
    /// exist or a prediction-error variance becomes non-positive.
    pub(crate) fn filter(&self, observations: &[f64]) -> Result<FilterOutput, EstimatorError> {
        let r = self.dim();
        let p0 = self.stationary_covariance()?;
        let mut p: Vec<Vec<f64>> = p0.outer_iter().map(|row| row.to_vec()).collect();
        let mut state = vec![0.0; r];

        let mut innovations = Vec::with_capacity(observations.len());
        let mut variances = Vec::with_capacity(observations.len());
        let mut updated = vec![vec![0.0; r]; r];
        let mut tp = vec![vec![0.0; r + 1]; r];

        for &y in observations {
            let v = y - state[0];
            let f = p[0][0];
            if !f.is_finite() || f <= 0.0 {
                return Err(EstimatorError::Numerical(format!(
                    "prediction-error variance {f} is not positive"
                )));
            }
            innovations.push(v);
            variances.push(f);

            let gain: Vec<f64> = (0..r).map(|i| p[i][0] / f).collect();
            let filtered: Vec<f64> = (0..r).map(|i| state[i] + gain[i] * v).collect();
            for i in 0..r {
                for j in 0..r {
                    updated[i][j] = p[i][j] - gain[i] * p[0][j];
                }
            }

            for i in 0..r {
                state[i] = self.phi[i] * filtered[0] + filtered.get(i + 1).copied().unwrap_or(0.0);
            }
            for i in 0..r {
                for j in 0..r {
                    let below = if i + 1 < r { updated[i + 1][j] } else { 0.0 };
                    tp[i][j] = self.phi[i] * updated[0][j] + below;
                }
            }
            for i in 0..r {
                for j in 0..r {
                    p[i][j] = tp[i][0] * self.phi[j]
                        + tp[i][j + 1]
                        + self.selection[i] * self.selection[j];
                }
            }
        }

        if innovations.iter().any(|v| !v.is_finite()) {
            return Err(EstimatorError::Numerical("filter diverged".to_string()));
        }
        Ok(FilterOutput { innovations, variances, next_state: state })
    }

    /// Point forecasts of the next `steps` observations from a predicted state.
    pub(crate) fn project(&self, next_state: &[f64], steps: usize) -> Vec<f64> {
        let r = self.dim();
        let mut state = next_state.to_vec();
        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            out.push(state[0]);
            let first = state[0];
            for i in 0..r {
                state[i] = self.phi[i] * first + state.get(i + 1).copied().unwrap_or(0.0);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn ar1_stationary_variance() {
        let ss = ArmaStateSpace::new(&[0.5], &[]);
        let p = ss.stationary_covariance().unwrap();
        assert_relative_eq!(p[[0, 0]], 1.0 / (1.0 - 0.25), epsilon = 1e-10);
    }

    #[test]
    fn ma1_stationary_variance() {
        let ss = ArmaStateSpace::new(&[], &[0.4]);
        assert_eq!(ss.dim(), 2);
        let p = ss.stationary_covariance().unwrap();
        assert_relative_eq!(p[[0, 0]], 1.0 + 0.16, epsilon = 1e-10);
    }

    #[test]
    fn unit_root_has_no_stationary_covariance() {
        let ss = ArmaStateSpace::new(&[1.0], &[]);
        assert!(ss.stationary_covariance().is_err());
    }

    #[test]
    fn ar1_innovations_match_residuals() {
        // After the first observation the AR(1) prediction is 0.5 * y_{t-1}.
        let y = [1.0, 2.0, -1.0, 0.5];
        let ss = ArmaStateSpace::new(&[0.5], &[]);
        let out = ss.filter(&y).unwrap();
        assert_relative_eq!(out.innovations[0], 1.0);
        assert_relative_eq!(out.variances[0], 4.0 / 3.0, epsilon = 1e-10);
        for t in 1..y.len() {
            assert_relative_eq!(out.innovations[t], y[t] - 0.5 * y[t - 1], epsilon = 1e-10);
            assert_relative_eq!(out.variances[t], 1.0, epsilon = 1e-10);
        }
        assert_relative_eq!(out.next_state[0], 0.25, epsilon = 1e-10);
    }

    #[test]
    fn white_noise_likelihood() {
        let y = [1.0, -1.0, 1.0, -1.0];
        let out = ArmaStateSpace::new(&[], &[]).filter(&y).unwrap();
        assert_relative_eq!(out.sigma2(), 1.0);
        let expected = -2.0 * ((2.0 * std::f64::consts::PI).ln() + 1.0);
        assert_relative_eq!(out.concentrated_log_likelihood(), expected, epsilon = 1e-12);
    }

    #[test]
    fn projection_decays_geometrically() {
        let ss = ArmaStateSpace::new(&[0.5], &[]);
        let path = ss.project(&[2.0], 3);
        assert_eq!(path, vec![2.0, 1.0, 0.5]);
    }
}
