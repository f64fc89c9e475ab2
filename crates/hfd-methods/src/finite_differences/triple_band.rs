//! Tridiagonal difference operators along one grid dimension.

use std::ops::Deref;
use std::sync::Arc;

use hfd_core::{Real, Size};
use hfd_math::Array;

use super::mesher::FdmMesherComposite;

/// A per-dimension tridiagonal operator over the composite layout.
///
/// Each row couples a node with its two neighbours along `direction`; edge
/// rows carry a zero coefficient towards the missing neighbour. Rows of
/// several such operators along the same direction can be summed, scaled by
/// grid functions, and solved line by line with the Thomas algorithm.
#[derive(Debug, Clone)]
pub struct TripleBandLinearOp {
    mesher: Arc<FdmMesherComposite>,
    direction: Size,
    i0: Vec<Size>,
    i2: Vec<Size>,
    lower: Vec<Real>,
    diag: Vec<Real>,
    upper: Vec<Real>,
}

impl TripleBandLinearOp {
    /// Operator with all coefficients zero.
    pub fn new(direction: Size, mesher: &Arc<FdmMesherComposite>) -> Self {
        let layout = mesher.layout();
        let n = layout.size();
        let mut i0 = Vec::with_capacity(n);
        let mut i2 = Vec::with_capacity(n);
        for i in 0..n {
            i0.push(layout.neighbour(i, direction, -1).unwrap_or(i));
            i2.push(layout.neighbour(i, direction, 1).unwrap_or(i));
        }
        Self {
            mesher: Arc::clone(mesher),
            direction,
            i0,
            i2,
            lower: vec![0.0; n],
            diag: vec![0.0; n],
            upper: vec![0.0; n],
        }
    }

    /// The direction this operator differentiates along.
    pub fn direction(&self) -> Size {
        self.direction
    }

    /// Number of grid nodes the operator acts on.
    pub fn size(&self) -> Size {
        self.diag.len()
    }

    /// Apply the operator to a grid function.
    pub fn apply(&self, u: &Array) -> Array {
        let mut y = Array::zeros(u.size());
        for i in 0..u.size() {
            y[i] = self.lower[i] * u[self.i0[i]]
                + self.diag[i] * u[i]
                + self.upper[i] * u[self.i2[i]];
        }
        y
    }

    /// Row scaling: the operator `diag(u) · L`.
    pub fn mult(&self, u: &Array) -> Self {
        let mut op = self.clone();
        for i in 0..u.size() {
            op.lower[i] *= u[i];
            op.diag[i] *= u[i];
            op.upper[i] *= u[i];
        }
        op
    }

    /// Column scaling: the operator `L · diag(u)`.
    pub fn mult_r(&self, u: &Array) -> Self {
        let mut op = self.clone();
        for i in 0..u.size() {
            op.lower[i] *= u[self.i0[i]];
            op.diag[i] *= u[i];
            op.upper[i] *= u[self.i2[i]];
        }
        op
    }

    /// Uniform scaling by a constant.
    pub fn scale(&self, s: Real) -> Self {
        let mut op = self.clone();
        for i in 0..op.diag.len() {
            op.lower[i] *= s;
            op.diag[i] *= s;
            op.upper[i] *= s;
        }
        op
    }

    /// Row-wise sum of two operators along the same direction.
    pub fn add(&self, other: &Self) -> Self {
        debug_assert_eq!(self.direction, other.direction);
        let mut op = self.clone();
        for i in 0..op.diag.len() {
            op.lower[i] += other.lower[i];
            op.diag[i] += other.diag[i];
            op.upper[i] += other.upper[i];
        }
        op
    }

    /// Add `s · I`.
    pub fn add_identity(&self, s: Real) -> Self {
        let mut op = self.clone();
        for d in &mut op.diag {
            *d += s;
        }
        op
    }

    /// Add `diag(u)`.
    pub fn add_diagonal(&self, u: &Array) -> Self {
        let mut op = self.clone();
        for i in 0..u.size() {
            op.diag[i] += u[i];
        }
        op
    }

    /// The `(lower, diag, upper)` coefficients of row `i`.
    pub fn row(&self, i: Size) -> (Real, Real, Real) {
        (self.lower[i], self.diag[i], self.upper[i])
    }

    /// Overwrite the coefficients of row `i`.
    pub fn set_row(&mut self, i: Size, lower: Real, diag: Real, upper: Real) {
        self.lower[i] = lower;
        self.diag[i] = diag;
        self.upper[i] = upper;
    }

    /// Solve `(a·L + b·I) x = r` line by line with the Thomas algorithm.
    pub fn solve_splitting(&self, r: &Array, a: Real, b: Real) -> Array {
        let layout = self.mesher.layout();
        let m = layout.dim_size(self.direction);
        let s = layout.spacing(self.direction);
        let mut x = Array::zeros(r.size());
        let mut cp = vec![0.0; m];
        let mut dp = vec![0.0; m];
        for base in layout.line_starts(self.direction) {
            let idx = |k: Size| base + k * s;
            let row = |k: Size| {
                let i = idx(k);
                (a * self.lower[i], a * self.diag[i] + b, a * self.upper[i])
            };
            let (_, d0, u0) = row(0);
            cp[0] = u0 / d0;
            dp[0] = r[idx(0)] / d0;
            for k in 1..m {
                let (lo, d, up) = row(k);
                let denom = d - lo * cp[k - 1];
                cp[k] = up / denom;
                dp[k] = (r[idx(k)] - lo * dp[k - 1]) / denom;
            }
            x[idx(m - 1)] = dp[m - 1];
            for k in (0..m - 1).rev() {
                x[idx(k)] = dp[k] - cp[k] * x[idx(k + 1)];
            }
        }
        x
    }
}

// ── Derivative stencils ───────────────────────────────────────────────────

/// Second-order non-uniform first-derivative stencil; one-sided at the edges.
#[derive(Debug, Clone)]
pub struct FirstDerivativeOp(TripleBandLinearOp);

impl FirstDerivativeOp {
    /// Build the stencil along `direction`.
    pub fn new(direction: Size, mesher: &Arc<FdmMesherComposite>) -> Self {
        let mut op = TripleBandLinearOp::new(direction, mesher);
        let layout = mesher.layout().clone();
        let m = layout.dim_size(direction);
        for i in 0..layout.size() {
            let c = layout.coordinate(i, direction);
            if c == 0 {
                let hp = mesher.dplus(i, direction);
                op.set_row(i, 0.0, -1.0 / hp, 1.0 / hp);
            } else if c == m - 1 {
                let hm = mesher.dminus(i, direction);
                op.set_row(i, -1.0 / hm, 1.0 / hm, 0.0);
            } else {
                let hm = mesher.dminus(i, direction);
                let hp = mesher.dplus(i, direction);
                let zeta_m = hm * (hm + hp);
                let zeta_0 = hm * hp;
                let zeta_p = hp * (hm + hp);
                op.set_row(i, -hp / zeta_m, (hp - hm) / zeta_0, hm / zeta_p);
            }
        }
        Self(op)
    }

    /// Unwrap into the generic tridiagonal operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

impl Deref for FirstDerivativeOp {
    type Target = TripleBandLinearOp;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Second-order non-uniform second-derivative stencil; zero rows at the
/// edges, where boundary conditions take over.
#[derive(Debug, Clone)]
pub struct SecondDerivativeOp(TripleBandLinearOp);

impl SecondDerivativeOp {
    /// Build the stencil along `direction`.
    pub fn new(direction: Size, mesher: &Arc<FdmMesherComposite>) -> Self {
        let mut op = TripleBandLinearOp::new(direction, mesher);
        let layout = mesher.layout().clone();
        let m = layout.dim_size(direction);
        for i in 0..layout.size() {
            let c = layout.coordinate(i, direction);
            if c == 0 || c == m - 1 {
                continue;
            }
            let hm = mesher.dminus(i, direction);
            let hp = mesher.dplus(i, direction);
            let zeta_m = hm * (hm + hp);
            let zeta_0 = hm * hp;
            let zeta_p = hp * (hm + hp);
            op.set_row(i, 2.0 / zeta_m, -2.0 / zeta_0, 2.0 / zeta_p);
        }
        Self(op)
    }

    /// Unwrap into the generic tridiagonal operator.
    pub fn into_inner(self) -> TripleBandLinearOp {
        self.0
    }
}

impl Deref for SecondDerivativeOp {
    type Target = TripleBandLinearOp;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::mesher::Mesher1d;
    use approx::assert_abs_diff_eq;

    fn composite_1d(n: usize) -> Arc<FdmMesherComposite> {
        let xs: Vec<Real> = (0..n).map(|i| (i as Real / (n - 1) as Real).powi(2) * 2.0).collect();
        let mut xs = xs;
        xs[0] = 1e-3; // keep strictly increasing
        Arc::new(FdmMesherComposite::from_mesher(Mesher1d::predefined(&xs).unwrap()))
    }

    #[test]
    fn first_derivative_is_exact_for_quadratics() {
        let mesher = composite_1d(21);
        let op = FirstDerivativeOp::new(0, &mesher);
        let xs = mesher.locations(0);
        let u = Array::from_vec(xs.iter().map(|x| x * x + 2.0 * x).collect());
        let du = op.apply(&u);
        for (i, &x) in xs.iter().enumerate().skip(1).take(xs.len() - 2) {
            assert_abs_diff_eq!(du[i], 2.0 * x + 2.0, epsilon = 1e-10);
        }
        // one-sided edge rows are first-order exact for linear functions
        let lin = Array::from_vec(xs.iter().map(|x| 3.0 * x - 1.0).collect());
        let dlin = op.apply(&lin);
        assert_abs_diff_eq!(dlin[0], 3.0, epsilon = 1e-10);
        assert_abs_diff_eq!(dlin[xs.len() - 1], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn second_derivative_is_exact_for_quadratics() {
        let mesher = composite_1d(21);
        let op = SecondDerivativeOp::new(0, &mesher);
        let xs = mesher.locations(0);
        let u = Array::from_vec(xs.iter().map(|x| 0.5 * x * x - x).collect());
        let ddu = op.apply(&u);
        for i in 1..xs.len() - 1 {
            assert_abs_diff_eq!(ddu[i], 1.0, epsilon = 1e-9);
        }
        assert_eq!(ddu[0], 0.0);
        assert_eq!(ddu[xs.len() - 1], 0.0);
    }

    #[test]
    fn solve_splitting_inverts_the_shifted_operator() {
        let mesher = composite_1d(31);
        let op = SecondDerivativeOp::new(0, &mesher).into_inner();
        let rhs = Array::from_vec(
            mesher.locations(0).iter().map(|x| (3.0 * x).sin()).collect(),
        );
        let a = -0.01;
        let x = op.solve_splitting(&rhs, a, 1.0);
        let back = op.apply(&x) * a + &x;
        for i in 0..rhs.size() {
            assert_abs_diff_eq!(back[i], rhs[i], epsilon = 1e-11);
        }
    }

    #[test]
    fn row_and_column_scaling_differ_on_non_constant_factors() {
        let mesher = composite_1d(11);
        let op = FirstDerivativeOp::new(0, &mesher).into_inner();
        let factor = Array::from_vec(mesher.locations(0));
        let u = Array::from_vec(mesher.locations(0).iter().map(|x| x.exp()).collect());
        let row = op.mult(&factor).apply(&u);
        let col = op.mult_r(&factor).apply(&u);
        let direct_row = op.apply(&u).mul_elem(&factor);
        let direct_col = op.apply(&u.mul_elem(&factor));
        for i in 0..u.size() {
            assert_abs_diff_eq!(row[i], direct_row[i], epsilon = 1e-12);
            assert_abs_diff_eq!(col[i], direct_col[i], epsilon = 1e-12);
        }
    }
}
