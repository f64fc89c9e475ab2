//! Discrete integrators operating on pre-computed data arrays.
//!
//! These integrate a function known only through its values at given
//! abscissae, e.g. a probability density evolved on a non-uniform mesh.

use hfd_core::Real;

/// Composite trapezoidal rule on discrete data points.
///
/// Given abscissae `x[0..n]` and ordinates `f[0..n]`, returns
/// `Σ ½ (x[i+1]-x[i]) (f[i] + f[i+1])`.
pub fn discrete_trapezoid(x: &[Real], f: &[Real]) -> Real {
    debug_assert_eq!(x.len(), f.len());
    let n = x.len();
    if n < 2 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n - 1 {
        sum += (x[i + 1] - x[i]) * (f[i] + f[i + 1]);
    }
    0.5 * sum
}

/// Composite Simpson rule on discrete data points with non-uniform spacing.
///
/// Pairs of sub-intervals are processed with the Simpson 1/3 rule adapted to
/// unequal spacing; a trailing unpaired interval falls back to the trapezoid
/// rule.
pub fn discrete_simpson(x: &[Real], f: &[Real]) -> Real {
    debug_assert_eq!(x.len(), f.len());
    let n = x.len();
    if n < 3 {
        return discrete_trapezoid(x, f);
    }

    let mut sum = 0.0;
    let mut j = 0;
    while j + 2 < n {
        let dx0 = x[j + 1] - x[j];
        let dx1 = x[j + 2] - x[j + 1];
        let dd = dx0 + dx1;
        let k = dd / (6.0 * dx1 * dx0);
        sum += k
            * (dx1 * (2.0 * dx0 - dx1) * f[j]
                + dd * dd * f[j + 1]
                + dx0 * (2.0 * dx1 - dx0) * f[j + 2]);
        j += 2;
    }
    if n % 2 == 0 {
        sum += 0.5 * (x[n - 1] - x[n - 2]) * (f[n - 1] + f[n - 2]);
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn trapezoid_exact_for_linear() {
        let x = [0.0, 0.2, 0.55, 0.8, 1.0];
        let f: Vec<Real> = x.iter().map(|&xi| 3.0 * xi - 1.0).collect();
        assert_abs_diff_eq!(discrete_trapezoid(&x, &f), 0.5, epsilon = 1e-14);
    }

    #[test]
    fn simpson_exact_for_quadratic_nonuniform() {
        let x = [0.0, 0.3, 0.7, 0.8, 1.0];
        let f: Vec<Real> = x.iter().map(|&xi| xi * xi).collect();
        assert_abs_diff_eq!(discrete_simpson(&x, &f), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn simpson_converges_on_smooth_integrand() {
        let n = 201;
        let x: Vec<Real> = (0..n).map(|i| i as Real / (n - 1) as Real).collect();
        let f: Vec<Real> = x.iter().map(|&xi| xi.exp()).collect();
        assert_abs_diff_eq!(
            discrete_simpson(&x, &f),
            std::f64::consts::E - 1.0,
            epsilon = 1e-9
        );
    }
}
