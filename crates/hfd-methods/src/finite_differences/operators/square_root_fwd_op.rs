//! Forward (Fokker-Planck) operator of the square-root variance process.

use std::sync::Arc;

use hfd_core::{ensure, errors::Result, fail, Real, Size, Time};
use hfd_math::Array;

use super::FdmLinearOpComposite;
use crate::finite_differences::mesher::FdmMesherComposite;
use crate::finite_differences::triple_band::{
    FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp,
};

/// Change of variables applied to the variance density before discretising.
///
/// The raw density blows up at `v = 0` when the Feller condition fails;
/// `Power` solves for `q = v^α p` with `α = 1 - 2κθ/σ²`, which stays bounded,
/// and `Log` solves for the density of `z = ln v` on a logarithmic mesh.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformationType {
    /// Solve for the density `p(v)` itself.
    Plain,
    /// Solve for `q = v^α p` with `α = 1 - 2κθ/σ²`.
    Power,
    /// Solve for the density of `z = ln v`; the mesh holds `z`.
    Log,
}

impl TransformationType {
    /// Heuristic choice from the Feller ratio `2κθ/σ²`: `Plain` when the
    /// condition holds comfortably, `Power` for moderate violation, `Log`
    /// for strong violation.
    pub fn for_feller_ratio(ratio: Real) -> Self {
        if ratio >= 1.0 {
            TransformationType::Plain
        } else if ratio >= 0.25 {
            TransformationType::Power
        } else {
            TransformationType::Log
        }
    }
}

/// One-dimensional Fokker-Planck operator of
/// `dv = κ(θ - v) dt + σ √v dW`, with zero-flux boundary rows built in.
///
/// The interior rows discretise the expanded adjoint generator of the chosen
/// transform; the edge rows eliminate the ghost node with the slope implied
/// by a vanishing probability flux, so total mass is conserved up to
/// quadrature error.
pub struct FdmSquareRootFwdOp {
    direction: Size,
    transform: TransformationType,
    alpha: Real,
    v: Array,
    map: TripleBandLinearOp,
}

impl FdmSquareRootFwdOp {
    /// Build the operator along `direction` of the composite mesher.
    pub fn new(
        mesher: &Arc<FdmMesherComposite>,
        kappa: Real,
        theta: Real,
        sigma: Real,
        direction: Size,
        transform: TransformationType,
    ) -> Result<Self> {
        ensure!(sigma > 0.0, InvalidParameter, "vol-of-vol must be positive, got {sigma}");
        let alpha = 1.0 - 2.0 * kappa * theta / (sigma * sigma);

        let coordinates = Array::from_vec(mesher.locations(direction));
        let v = match transform {
            TransformationType::Log => coordinates.map(Real::exp),
            _ => coordinates,
        };
        for i in 0..v.size() {
            ensure!(v[i] > 0.0, InvalidGrid, "variance mesh must be positive, got {}", v[i]);
        }

        // Expanded row form of the transformed adjoint generator:
        // diffusion(v)·∂² + convection(v)·∂ + reaction(v), plus the
        // zero-flux slope ratio q' = slope(v)·q at the boundaries.
        let sig2 = sigma * sigma;
        let (diffusion, convection, reaction, slope): (
            fn(Real, Real, Real, Real) -> Real,
            fn(Real, Real, Real, Real) -> Real,
            fn(Real, Real, Real, Real) -> Real,
            fn(Real, Real, Real, Real) -> Real,
        ) = match transform {
            TransformationType::Plain => (
                |v, _k, _t, s2| 0.5 * s2 * v,
                |v, k, t, s2| s2 - k * t + k * v,
                |_v, k, _t, _s2| k,
                |v, k, t, s2| (k * (t - v) - 0.5 * s2) / (0.5 * s2 * v),
            ),
            TransformationType::Power => (
                |v, _k, _t, s2| 0.5 * s2 * v,
                |v, k, t, _s2| k * (t + v),
                |_v, k, t, s2| 2.0 * k * k * t / s2,
                |_v, k, _t, s2| -2.0 * k / s2,
            ),
            TransformationType::Log => (
                |v, _k, _t, s2| 0.5 * s2 / v,
                |v, k, t, s2| k - (k * t + 0.5 * s2) / v,
                |v, k, t, _s2| k * t / v,
                |v, k, t, s2| 2.0 * k * (t - v) / s2,
            ),
            #[allow(unreachable_patterns)]
            _ => fail!(UnsupportedTransformation, "unknown variance transformation {transform:?}"),
        };

        let d_arr = v.map(|vi| diffusion(vi, kappa, theta, sig2));
        let c_arr = v.map(|vi| convection(vi, kappa, theta, sig2));
        let r_arr = v.map(|vi| reaction(vi, kappa, theta, sig2));

        let mut map = SecondDerivativeOp::new(direction, mesher)
            .into_inner()
            .mult(&d_arr)
            .add(&FirstDerivativeOp::new(direction, mesher).into_inner().mult(&c_arr))
            .add_diagonal(&r_arr);

        let layout = mesher.layout().clone();
        let m = layout.dim_size(direction);
        for i in 0..layout.size() {
            let c = layout.coordinate(i, direction);
            let (d, cv, rv) = (d_arr[i], c_arr[i], r_arr[i]);
            let sl = slope(v[i], kappa, theta, sig2);
            if c == 0 {
                let h = mesher.dplus(i, direction);
                let w = 2.0 * d / (h * h);
                map.set_row(i, 0.0, w * (-1.0 - h * sl) + cv * sl + rv, w);
            } else if c == m - 1 {
                let h = mesher.dminus(i, direction);
                let w = 2.0 * d / (h * h);
                map.set_row(i, w, w * (-1.0 + h * sl) + cv * sl + rv, 0.0);
            }
        }

        Ok(Self { direction, transform, alpha, v, map })
    }

    /// The transformation the operator solves in.
    pub fn transform(&self) -> TransformationType {
        self.transform
    }

    /// The power-transform exponent `α = 1 - 2κθ/σ²`.
    pub fn alpha(&self) -> Real {
        self.alpha
    }

    /// The variance value at each node (`e^z` under the log transform).
    pub fn v(&self) -> &Array {
        &self.v
    }

    /// The assembled tridiagonal map.
    pub fn map(&self) -> &TripleBandLinearOp {
        &self.map
    }
}

impl FdmLinearOpComposite for FdmSquareRootFwdOp {
    fn size(&self) -> Size {
        self.v.size()
    }

    fn directions(&self) -> Size {
        self.direction + 1
    }

    fn set_time(&mut self, _t1: Time, _t2: Time) {}

    fn apply(&self, u: &Array) -> Array {
        self.map.apply(u)
    }

    fn apply_direction(&self, d: Size, u: &Array) -> Array {
        if d == self.direction {
            self.map.apply(u)
        } else {
            Array::zeros(u.size())
        }
    }

    fn apply_mixed(&self, u: &Array) -> Array {
        Array::zeros(u.size())
    }

    fn solve_splitting(&self, d: Size, r: &Array, s: Real) -> Array {
        if d == self.direction {
            self.map.solve_splitting(r, s, 1.0)
        } else {
            r.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::mesher::Mesher1d;
    use approx::assert_abs_diff_eq;
    use hfd_processes::SquareRootProcess;

    fn stationary_quantile_mesher(
        process: &SquareRootProcess,
        size: usize,
        p_lo: Real,
        p_hi: Real,
    ) -> Arc<FdmMesherComposite> {
        let grid: Vec<Real> = (0..size)
            .map(|i| {
                let p = p_lo + (p_hi - p_lo) * i as Real / (size - 1) as Real;
                process.stationary_quantile(p).unwrap()
            })
            .collect();
        Arc::new(FdmMesherComposite::from_mesher(Mesher1d::predefined(&grid).unwrap()))
    }

    // Under the power transform the stationary density becomes
    // q(v) ∝ exp(-2κ/σ² · v), whose flux ½σ²v q' + κv q vanishes
    // identically; the discrete one-sided derivative must reproduce that.
    #[test]
    fn transformed_stationary_flux_vanishes_at_the_lower_boundary() {
        let (kappa, theta, sigma) = (1.0, 0.4, 2.0);
        let process = SquareRootProcess::new(kappa, theta, sigma).unwrap();
        let mesher = stationary_quantile_mesher(&process, 1001, 0.01, 0.99);
        let op =
            FdmSquareRootFwdOp::new(&mesher, kappa, theta, sigma, 0, TransformationType::Power)
                .unwrap();
        let alpha = op.alpha();
        let vs = mesher.locations(0);
        let q: Vec<Real> = vs
            .iter()
            .map(|&v| v.powf(alpha) * process.stationary_pdf(v))
            .collect();

        let h0 = vs[1] - vs[0];
        let h1 = vs[2] - vs[1];
        let dq = -(2.0 * h0 + h1) / (h0 * (h0 + h1)) * q[0]
            + (h0 + h1) / (h0 * h1) * q[1]
            - h0 / (h1 * (h0 + h1)) * q[2];
        let flux = 0.5 * sigma * sigma * vs[0] * dq + kappa * vs[0] * q[0];
        assert_abs_diff_eq!(flux, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn stationary_density_is_in_the_kernel_of_the_plain_operator() {
        let (kappa, theta, sigma) = (2.5, 0.2, 0.5);
        let process = SquareRootProcess::new(kappa, theta, sigma).unwrap();
        let mesher = stationary_quantile_mesher(&process, 2001, 0.005, 0.995);
        let op =
            FdmSquareRootFwdOp::new(&mesher, kappa, theta, sigma, 0, TransformationType::Plain)
                .unwrap();
        let vs = mesher.locations(0);
        let p = Array::from_vec(vs.iter().map(|&v| process.stationary_pdf(v)).collect());
        let ap = op.apply(&p);
        let scale = p.max();
        for i in 0..p.size() {
            assert_abs_diff_eq!(ap[i] / scale, 0.0, epsilon = 5e-3);
        }
    }

    #[test]
    fn log_transform_keeps_the_transformed_stationary_density_stationary() {
        let (kappa, theta, sigma) = (2.5, 0.2, 1.5);
        let process = SquareRootProcess::new(kappa, theta, sigma).unwrap();
        let z_lo = process.stationary_quantile(0.01).unwrap().ln();
        let z_hi = process.stationary_quantile(0.99).unwrap().ln();
        let mesher = Arc::new(FdmMesherComposite::from_mesher(
            Mesher1d::uniform(z_lo, z_hi, 2001).unwrap(),
        ));
        let op =
            FdmSquareRootFwdOp::new(&mesher, kappa, theta, sigma, 0, TransformationType::Log)
                .unwrap();
        // density of z = ln v is v·p(v)
        let pt = Array::from_vec(
            op.v().iter().map(|&v| v * process.stationary_pdf(v)).collect(),
        );
        let apt = op.apply(&pt);
        let scale = pt.max();
        for i in 0..pt.size() {
            assert_abs_diff_eq!(apt[i] / scale, 0.0, epsilon = 5e-3);
        }
    }

    #[test]
    fn rejects_a_non_positive_variance_mesh() {
        let mesher = Arc::new(FdmMesherComposite::from_mesher(
            Mesher1d::uniform(-0.1, 0.5, 10).unwrap(),
        ));
        assert!(
            FdmSquareRootFwdOp::new(&mesher, 1.0, 0.4, 0.8, 0, TransformationType::Plain).is_err()
        );
    }
}
