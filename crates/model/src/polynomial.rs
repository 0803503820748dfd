//! Lag polynomials and the stationarity-enforcing reparametrisation.
//!
//! Polynomials are coefficient vectors in increasing powers of the backshift
//! operator `B`, with the constant term first.

/// Product of two lag polynomials.
pub(crate) fn multiply(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, x) in a.iter().enumerate() {
        for (j, y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// `1 - c_1 B^step - c_2 B^(2 step) - ...`
fn ar_polynomial(coefs: &[f64], step: usize) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * step + 1];
    poly[0] = 1.0;
    for (k, c) in coefs.iter().enumerate() {
        poly[(k + 1) * step] = -c;
    }
    poly
}

/// `1 + c_1 B^step + c_2 B^(2 step) + ...`
fn ma_polynomial(coefs: &[f64], step: usize) -> Vec<f64> {
    let mut poly = vec![0.0; coefs.len() * step + 1];
    poly[0] = 1.0;
    for (k, c) in coefs.iter().enumerate() {
        poly[(k + 1) * step] = *c;
    }
    poly
}

/// Coefficients `a_i` with `φ(B) Φ(B^s) = 1 - Σ a_i B^i`.
pub(crate) fn expand_ar(ar: &[f64], seasonal_ar: &[f64], period: usize) -> Vec<f64> {
    let poly = multiply(&ar_polynomial(ar, 1), &ar_polynomial(seasonal_ar, period.max(1)));
    poly[1..].iter().map(|c| -c).collect()
}

/// Coefficients `b_j` with `θ(B) Θ(B^s) = 1 + Σ b_j B^j`.
pub(crate) fn expand_ma(ma: &[f64], seasonal_ma: &[f64], period: usize) -> Vec<f64> {
    let poly = multiply(&ma_polynomial(ma, 1), &ma_polynomial(seasonal_ma, period.max(1)));
    poly[1..].to_vec()
}

/// Full polynomial `(1 - B)^d (1 - B^s)^D`.
pub(crate) fn differencing(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = multiply(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = multiply(&poly, &seasonal);
        }
    }
    poly
}

/// First `n` weights of the MA(∞) representation of `(1 + Σ b_j B^j) / (1 - Σ a_i B^i)`.
pub(crate) fn psi_weights(ar: &[f64], ma: &[f64], n: usize) -> Vec<f64> {
    let mut psi = Vec::with_capacity(n);
    for j in 0..n {
        let mut value = if j == 0 { 1.0 } else { ma.get(j - 1).copied().unwrap_or(0.0) };
        for (i, a) in ar.iter().enumerate().take(j) {
            value += a * psi[j - 1 - i];
        }
        psi.push(value);
    }
    psi
}

/// Map unconstrained reals to the coefficients of a stationary AR polynomial.
///
/// Each input becomes a partial autocorrelation `u / sqrt(1 + u^2)` in
/// (-1, 1); the Durbin-Levinson recursion turns those into coefficients.
pub(crate) fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(unconstrained.len());
    for (k, u) in unconstrained.iter().enumerate() {
        let r = u / (1.0 + u * u).sqrt();
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = prev[j] - r * prev[k - 1 - j];
        }
        phi.push(r);
    }
    phi
}

/// Inverse of [`constrain_stationary`].
///
/// Partial autocorrelations are clipped to ±0.99 so that non-stationary
/// starting values still map to finite reals.
pub(crate) fn unconstrain_stationary(constrained: &[f64]) -> Vec<f64> {
    const LIMIT: f64 = 0.99;
    let n = constrained.len();
    let mut phi = constrained.to_vec();
    let mut partial = vec![0.0; n];
    for k in (0..n).rev() {
        let r = phi[k].clamp(-LIMIT, LIMIT);
        partial[k] = r;
        let denom = 1.0 - r * r;
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = (prev[j] + r * prev[k - 1 - j]) / denom;
        }
    }
    partial.iter().map(|r| r / (1.0 - r * r).sqrt()).collect()
}

/// Whether every root of `1 - Σ a_i z^i` lies outside the unit circle,
/// checked by the reverse Durbin-Levinson (Schur-Cohn) recursion.
pub(crate) fn is_stationary(ar: &[f64]) -> bool {
    let mut phi = ar.to_vec();
    for k in (0..phi.len()).rev() {
        let r = phi[k];
        if r.is_nan() || r.abs() >= 1.0 {
            return false;
        }
        let denom = 1.0 - r * r;
        let prev = phi.clone();
        for j in 0..k {
            phi[j] = (prev[j] + r * prev[k - 1 - j]) / denom;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn seasonal_ar_expansion() {
        // (1 - 0.5B)(1 - 0.3B^4) = 1 - 0.5B - 0.3B^4 + 0.15B^5
        let a = expand_ar(&[0.5], &[0.3], 4);
        assert_eq!(a.len(), 5);
        assert_relative_eq!(a[0], 0.5);
        assert_relative_eq!(a[3], 0.3);
        assert_relative_eq!(a[4], -0.15);
    }

    #[test]
    fn seasonal_ma_expansion() {
        let b = expand_ma(&[0.4], &[0.2], 3);
        assert_eq!(b, vec![0.4, 0.0, 0.2, 0.4 * 0.2]);
        assert!(expand_ma(&[], &[], 12).is_empty());
    }

    #[test]
    fn differencing_polynomials() {
        assert_eq!(differencing(1, 0, 0), vec![1.0, -1.0]);
        assert_eq!(differencing(2, 0, 0), vec![1.0, -2.0, 1.0]);
        assert_eq!(differencing(1, 1, 2), vec![1.0, -1.0, -1.0, 1.0]);
    }

    #[test]
    fn psi_weights_of_ar1() {
        let psi = psi_weights(&[0.5], &[], 4);
        assert_eq!(psi, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn psi_weights_of_random_walk() {
        let psi = psi_weights(&[1.0], &[0.3], 4);
        assert_relative_eq!(psi[0], 1.0);
        for w in &psi[1..] {
            assert_relative_eq!(*w, 1.3, epsilon = 1e-12);
        }
    }

    #[rstest]
    #[case(vec![0.0])]
    #[case(vec![0.8, -0.4])]
    #[case(vec![2.5, -1.0, 0.3])]
    fn constrained_coefficients_are_stationary(#[case] u: Vec<f64>) {
        assert!(is_stationary(&constrain_stationary(&u)));
    }

    #[test]
    fn reparametrisation_round_trip() {
        let phi = [0.6, -0.2, 0.1];
        let back = constrain_stationary(&unconstrain_stationary(&phi));
        for (a, b) in phi.iter().zip(&back) {
            assert_relative_eq!(a, b, epsilon = 1e-10);
        }
    }

    #[test]
    fn unit_root_is_not_stationary() {
        assert!(!is_stationary(&[1.0]));
        assert!(!is_stationary(&[0.5, 0.6]));
        assert!(is_stationary(&[]));
    }
}
