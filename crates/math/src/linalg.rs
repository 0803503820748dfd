//! Linear algebra operations for regression-based tests.

use std::f64::consts::PI;

use ndarray::{Array1, Array2};

use crate::MathError;

/// Pivot magnitude below which a matrix is treated as singular.
const SINGULAR_TOL: f64 = 1e-14;

/// Result of an ordinary least squares regression.
#[derive(Debug, Clone)]
pub struct OlsResult {
    /// Estimated coefficients.
    pub coefficients: Array1<f64>,
    /// Standard errors of the coefficients.
    pub std_errors: Array1<f64>,
    /// Residuals.
    pub residuals: Array1<f64>,
    /// Sum of squared residuals.
    pub ssr: f64,
    /// Number of observations.
    pub nobs: usize,
}

impl OlsResult {
    /// Number of estimated coefficients.
    #[must_use]
    pub fn n_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t-statistic of coefficient `i`.
    #[must_use]
    pub fn t_value(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood with the error variance profiled out.
    #[must_use]
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion, counting every coefficient.
    #[must_use]
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.n_params() as f64
    }

    /// Bayesian information criterion.
    #[must_use]
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + (self.nobs as f64).ln() * self.n_params() as f64
    }
}

/// Ordinary least squares regression of `y` on the columns of `x`.
///
/// Solves the normal equations `(X'X) beta = X'y` and derives standard
/// errors from `s^2 (X'X)^-1` with `s^2 = SSR / (n - k)`.
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x k); include a column of ones for an intercept
///
/// # Errors
/// Returns error if dimensions mismatch, `n <= k`, or `X'X` is singular.
pub fn ols(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsResult, MathError> {
    let n = y.len();
    let k = x.ncols();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if n == 0 || k == 0 {
        return Err(MathError::EmptyData);
    }
    if n <= k {
        return Err(MathError::InsufficientData { required: k + 1, actual: n });
    }

    let xtx = x.t().dot(x);
    let xty = x.t().dot(y);
    let xtx_inv = invert(&xtx)?;
    let coefficients = xtx_inv.dot(&xty);

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;
    let ssr: f64 = residuals.iter().map(|r| r * r).sum();

    let s2 = ssr / (n - k) as f64;
    let std_errors = Array1::from_iter((0..k).map(|i| (s2 * xtx_inv[[i, i]]).max(0.0).sqrt()));

    Ok(OlsResult { coefficients, std_errors, residuals, ssr, nobs: n })
}

/// Solve a linear system Ax = b using Gaussian elimination with partial pivoting.
///
/// # Errors
/// Returns error if `a` is not square, sizes disagree, or `a` is singular.
pub fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    if b.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.len() });
    }

    let mut aug = Array2::zeros((n, n + 1));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n]] = b[i];
    }

    for col in 0..n {
        pivot(&mut aug, col)?;
        for row in (col + 1)..n {
            let factor = aug[[row, col]] / aug[[col, col]];
            for j in col..=n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let mut sum = aug[[i, n]];
        for j in (i + 1)..n {
            sum -= aug[[i, j]] * x[j];
        }
        x[i] = sum / aug[[i, i]];
    }

    Ok(x)
}

/// Invert a square matrix by Gauss-Jordan elimination with partial pivoting.
///
/// # Errors
/// Returns error if `a` is not square or is singular.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }

    // [A | I] -> [I | A^-1]
    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = a[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        pivot(&mut aug, col)?;
        let diag = aug[[col, col]];
        for j in 0..2 * n {
            aug[[col, j]] /= diag;
        }
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = aug[[row, col]];
            if factor == 0.0 {
                continue;
            }
            for j in 0..2 * n {
                aug[[row, j]] -= factor * aug[[col, j]];
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }
    Ok(inv)
}

/// Swap the row with the largest entry in `col` (at or below the diagonal) into place.
fn pivot(aug: &mut Array2<f64>, col: usize) -> Result<(), MathError> {
    let n = aug.nrows();
    let mut max_row = col;
    let mut max_val = aug[[col, col]].abs();
    for row in (col + 1)..n {
        if aug[[row, col]].abs() > max_val {
            max_val = aug[[row, col]].abs();
            max_row = row;
        }
    }

    if !max_val.is_finite() {
        return Err(MathError::NumericalInstability("non-finite matrix entry".to_string()));
    }
    if max_val < SINGULAR_TOL {
        return Err(MathError::LinearAlgebra("matrix is singular or nearly singular".to_string()));
    }

    if max_row != col {
        for j in 0..aug.ncols() {
            aug.swap([col, j], [max_row, j]);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn ols_recovers_exact_line() {
        let y = array![1.0, 3.0, 5.0, 7.0, 9.0];
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];

        let result = ols(&y, &x).unwrap();
        assert_relative_eq!(result.coefficients[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.coefficients[1], 2.0, epsilon = 1e-10);
        assert!(result.ssr < 1e-20);
    }

    #[test]
    fn ols_standard_errors() {
        // y = 2x + noise; slope SE = sqrt(s^2 / Sxx)
        let y = array![0.1, 1.9, 4.2, 5.8, 8.1];
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];
        let result = ols(&y, &x).unwrap();

        let s2 = result.ssr / 3.0;
        assert_relative_eq!(result.std_errors[1], (s2 / 10.0).sqrt(), epsilon = 1e-10);
        assert_relative_eq!(result.t_value(1), result.coefficients[1] / result.std_errors[1]);
    }

    #[test]
    fn ols_aic_counts_coefficients() {
        let y = array![0.1, 1.9, 4.2, 5.8, 8.1, 9.7];
        let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0], [1.0, 5.0]];
        let result = ols(&y, &x).unwrap();
        assert_relative_eq!(result.aic(), -2.0 * result.log_likelihood() + 4.0);
    }

    #[test]
    fn ols_rejects_short_sample() {
        let y = array![1.0, 2.0];
        let x = array![[1.0, 0.0], [1.0, 1.0]];
        assert!(matches!(ols(&y, &x), Err(MathError::InsufficientData { .. })));
    }

    #[test]
    fn solve_requires_pivoting() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![2.0, 3.0];
        let x = solve_linear_system(&a, &b).unwrap();
        assert_relative_eq!(x[0], 3.0);
        assert_relative_eq!(x[1], 2.0);
    }

    #[test]
    fn invert_round_trip() {
        let a = array![[4.0, 7.0], [2.0, 6.0]];
        let inv = invert(&a).unwrap();
        let id = a.dot(&inv);
        assert_relative_eq!(id[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(id[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id[[1, 0]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(id[[1, 1]], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(invert(&a), Err(MathError::LinearAlgebra(_))));
    }
}
