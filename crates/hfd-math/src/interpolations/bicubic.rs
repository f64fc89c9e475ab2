//! Bicubic spline interpolation on a rectangular 2-D grid.
//!
//! One natural cubic spline is built per y-row along `x`; a query first
//! evaluates every row spline at `x` and then splines the resulting column
//! along `y`.  The x-partials needed for delta/gamma read-outs are obtained
//! the same way from the row splines' derivatives.

use hfd_core::{ensure, errors::Result, Real};

use super::{CubicNaturalSpline, Interpolation1D};

/// Bicubic spline on a rectangular grid.
///
/// `z` is stored row-major: `z[j * nx + i] = f(xs[i], ys[j])`.
#[derive(Debug, Clone)]
pub struct BicubicSpline {
    ys: Vec<Real>,
    row_splines: Vec<CubicNaturalSpline>,
}

impl BicubicSpline {
    /// Build a bicubic spline on the grid `(xs × ys → z)`.
    ///
    /// Both `xs` and `ys` must be sorted with at least 3 elements each.
    pub fn new(xs: &[Real], ys: &[Real], z: &[Real]) -> Result<Self> {
        let nx = xs.len();
        let ny = ys.len();
        ensure!(ny >= 3, InvalidParameter, "need at least 3 y grid points");
        ensure!(
            z.len() == nx * ny,
            InvalidParameter,
            "z length ({}) must equal nx*ny ({nx}*{ny})",
            z.len()
        );

        let mut row_splines = Vec::with_capacity(ny);
        for j in 0..ny {
            row_splines.push(CubicNaturalSpline::new(xs, &z[j * nx..(j + 1) * nx])?);
        }

        Ok(Self {
            ys: ys.to_vec(),
            row_splines,
        })
    }

    fn column_spline<F>(&self, f: F) -> Result<CubicNaturalSpline>
    where
        F: Fn(&CubicNaturalSpline) -> Real,
    {
        let column: Vec<Real> = self.row_splines.iter().map(f).collect();
        CubicNaturalSpline::new(&self.ys, &column)
    }

    /// Evaluate the surface at `(x, y)`.
    pub fn value(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column_spline(|s| s.value(x))?.value(y))
    }

    /// Partial derivative `∂f/∂x` at `(x, y)`.
    pub fn derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column_spline(|s| s.derivative(x))?.value(y))
    }

    /// Second partial derivative `∂²f/∂x²` at `(x, y)`.
    pub fn second_derivative_x(&self, x: Real, y: Real) -> Result<Real> {
        Ok(self.column_spline(|s| s.second_derivative(x))?.value(y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid<F: Fn(Real, Real) -> Real>(xs: &[Real], ys: &[Real], f: F) -> Vec<Real> {
        let mut z = Vec::with_capacity(xs.len() * ys.len());
        for &y in ys {
            for &x in xs {
                z.push(f(x, y));
            }
        }
        z
    }

    #[test]
    fn exact_on_grid_points() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let z = grid(&xs, &ys, |x, y| x * x + y);
        let s = BicubicSpline::new(&xs, &ys, &z).unwrap();
        for &y in &ys {
            for &x in &xs {
                assert_abs_diff_eq!(s.value(x, y).unwrap(), x * x + y, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn reproduces_bilinear_function() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let z = grid(&xs, &ys, |x, y| 2.0 * x + 3.0 * y + 1.0);
        let s = BicubicSpline::new(&xs, &ys, &z).unwrap();
        assert_abs_diff_eq!(s.value(1.5, 2.5).unwrap(), 11.5, epsilon = 1e-10);
        assert_abs_diff_eq!(s.derivative_x(1.5, 2.5).unwrap(), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(s.second_derivative_x(1.5, 2.5).unwrap(), 0.0, epsilon = 1e-10);
    }

    #[test]
    fn x_partials_of_smooth_surface() {
        let n = 31;
        let xs: Vec<Real> = (0..n).map(|i| i as Real / (n - 1) as Real * 2.0).collect();
        let ys: Vec<Real> = (0..n).map(|i| i as Real / (n - 1) as Real).collect();
        let z = grid(&xs, &ys, |x, y| x * x * (1.0 + y));
        let s = BicubicSpline::new(&xs, &ys, &z).unwrap();
        assert_abs_diff_eq!(s.derivative_x(1.0, 0.5).unwrap(), 3.0, epsilon = 1e-3);
        assert_abs_diff_eq!(s.second_derivative_x(1.0, 0.5).unwrap(), 3.0, epsilon = 1e-2);
    }
}
