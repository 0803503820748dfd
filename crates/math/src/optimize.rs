//! Derivative-free minimisation.

use crate::MathError;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// Nelder-Mead stopping and start-up parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NelderMeadConfig {
    /// Maximum number of simplex iterations.
    pub max_iter: usize,
    /// Absolute tolerance on the spread of vertex coordinates.
    pub xatol: f64,
    /// Absolute tolerance on the spread of objective values.
    pub fatol: f64,
    /// Offset applied to each coordinate to build the initial simplex.
    pub initial_step: f64,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self { max_iter: 2_000, xatol: 1e-6, fatol: 1e-8, initial_step: 0.1 }
    }
}

/// Outcome of a minimisation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Minimum {
    /// Best point found.
    pub x: Vec<f64>,
    /// Objective value at `x`.
    pub fval: f64,
    /// Iterations performed.
    pub iterations: usize,
    /// Whether both tolerances were met before `max_iter`.
    pub converged: bool,
}

/// Nelder-Mead downhill simplex minimiser.
///
/// Non-finite objective values are treated as `+inf`, so the objective may
/// signal an infeasible point by returning NaN or infinity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NelderMead {
    config: NelderMeadConfig,
}

impl NelderMead {
    /// Create a minimiser with the given configuration.
    #[must_use]
    pub const fn with_config(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &NelderMeadConfig {
        &self.config
    }

    /// Minimise `f` starting from `x0`.
    ///
    /// # Errors
    /// Returns error if `x0` is empty or the objective is non-finite at
    /// every vertex of the initial simplex.
    pub fn minimize<F>(&self, mut f: F, x0: &[f64]) -> Result<Minimum, MathError>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let n = x0.len();
        if n == 0 {
            return Err(MathError::EmptyData);
        }
        let mut eval = |x: &[f64]| {
            let v = f(x);
            if v.is_finite() { v } else { f64::INFINITY }
        };

        let mut simplex: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
        simplex.push(x0.to_vec());
        for i in 0..n {
            let mut vertex = x0.to_vec();
            vertex[i] += self.config.initial_step;
            simplex.push(vertex);
        }
        let mut values: Vec<f64> = simplex.iter().map(|x| eval(x)).collect();
        if values.iter().all(|v| v.is_infinite()) {
            return Err(MathError::NumericalInstability(
                "objective is not finite anywhere on the initial simplex".to_string(),
            ));
        }

        let mut iterations = 0;
        let mut converged = false;
        while iterations < self.config.max_iter {
            order_simplex(&mut simplex, &mut values);

            let f_spread = values[1..].iter().map(|v| (v - values[0]).abs()).fold(0.0, f64::max);
            let x_spread = simplex[1..]
                .iter()
                .flat_map(|v| v.iter().zip(&simplex[0]).map(|(a, b)| (a - b).abs()))
                .fold(0.0, f64::max);
            if f_spread <= self.config.fatol && x_spread <= self.config.xatol {
                converged = true;
                break;
            }
            iterations += 1;

            let centroid: Vec<f64> = (0..n)
                .map(|j| simplex[..n].iter().map(|v| v[j]).sum::<f64>() / n as f64)
                .collect();
            let worst = simplex[n].clone();
            let along = |t: f64| -> Vec<f64> {
                centroid.iter().zip(&worst).map(|(c, w)| c + t * (c - w)).collect()
            };

            let xr = along(REFLECTION);
            let fr = eval(&xr);

            if fr < values[0] {
                let xe = along(REFLECTION * EXPANSION);
                let fe = eval(&xe);
                if fe < fr {
                    simplex[n] = xe;
                    values[n] = fe;
                } else {
                    simplex[n] = xr;
                    values[n] = fr;
                }
                continue;
            }
            if fr < values[n - 1] {
                simplex[n] = xr;
                values[n] = fr;
                continue;
            }

            let (xc, fc, accept) = if fr < values[n] {
                let xc = along(REFLECTION * CONTRACTION);
                let fc = eval(&xc);
                (xc, fc, fc <= fr)
            } else {
                let xc = along(-CONTRACTION);
                let fc = eval(&xc);
                (xc, fc, fc < values[n])
            };
            if accept {
                simplex[n] = xc;
                values[n] = fc;
                continue;
            }

            let best = simplex[0].clone();
            for i in 1..=n {
                let shrunk: Vec<f64> =
                    best.iter().zip(&simplex[i]).map(|(b, x)| b + SHRINK * (x - b)).collect();
                values[i] = eval(&shrunk);
                simplex[i] = shrunk;
            }
        }

        order_simplex(&mut simplex, &mut values);
        Ok(Minimum { x: simplex.swap_remove(0), fval: values[0], iterations, converged })
    }
}

/// Sort vertices by objective value, best first.
fn order_simplex(simplex: &mut Vec<Vec<f64>>, values: &mut Vec<f64>) {
    let mut idx: Vec<usize> = (0..values.len()).collect();
    idx.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    *simplex = idx.iter().map(|&i| simplex[i].clone()).collect();
    *values = idx.iter().map(|&i| values[i]).collect();
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn minimises_quadratic_bowl() {
        let nm = NelderMead::default();
        let min = nm.minimize(|x| (x[0] - 3.0).powi(2) + (x[1] + 1.0).powi(2), &[0.0, 0.0]).unwrap();
        assert!(min.converged);
        assert_relative_eq!(min.x[0], 3.0, epsilon = 1e-4);
        assert_relative_eq!(min.x[1], -1.0, epsilon = 1e-4);
    }

    #[test]
    fn minimises_rosenbrock() {
        let nm = NelderMead::with_config(NelderMeadConfig {
            max_iter: 10_000,
            xatol: 1e-10,
            fatol: 1e-12,
            ..Default::default()
        });
        let rosen = |x: &[f64]| (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2);
        let min = nm.minimize(rosen, &[-1.2, 1.0]).unwrap();
        assert_relative_eq!(min.x[0], 1.0, epsilon = 1e-3);
        assert_relative_eq!(min.x[1], 1.0, epsilon = 1e-3);
    }

    #[test]
    fn infeasible_region_is_avoided() {
        let nm = NelderMead::default();
        let f = |x: &[f64]| if x[0] < 0.5 { f64::NAN } else { (x[0] - 1.0).powi(2) };
        let min = nm.minimize(f, &[2.0]).unwrap();
        assert_relative_eq!(min.x[0], 1.0, epsilon = 1e-4);
    }

    #[test]
    fn empty_start_is_rejected() {
        assert!(NelderMead::default().minimize(|_| 0.0, &[]).is_err());
    }
}
