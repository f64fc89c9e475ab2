//! The backward Heston pricing operator.

use std::sync::Arc;

use hfd_core::{Real, Size, Time};
use hfd_math::Array;
use hfd_processes::HestonProcess;

use super::FdmLinearOpComposite;
use crate::finite_differences::mesher::FdmMesherComposite;
use crate::finite_differences::nine_point::NinePointLinearOp;
use crate::finite_differences::triple_band::{
    FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp,
};

/// Spatial generator of the backward Heston PDE on a (log-spot, variance)
/// grid,
///
/// ```text
/// ½v ∂xx + (r-q-½v) ∂x + ½σ²v ∂vv + κ(θ-v) ∂v + ρσv ∂x∂v - r
/// ```
///
/// split into an x-direction part, a v-direction part (each absorbing half
/// of the `-r` reaction term) and the mixed-derivative part.
pub struct FdmHestonOp {
    process: HestonProcess,
    v: Array,
    first_x: TripleBandLinearOp,
    second_x_half_v: TripleBandLinearOp,
    dy_base: TripleBandLinearOp,
    correlation: NinePointLinearOp,
    dx_map: TripleBandLinearOp,
    dy_map: TripleBandLinearOp,
}

impl FdmHestonOp {
    /// Build the operator on the given two-dimensional mesher.
    pub fn new(mesher: &Arc<FdmMesherComposite>, process: &HestonProcess) -> Self {
        let v = Array::from_vec(mesher.locations(1));
        let kappa = process.kappa();
        let theta = process.theta();
        let sigma = process.sigma();
        let rho = process.rho();

        let first_x = FirstDerivativeOp::new(0, mesher).into_inner();
        let second_x_half_v = SecondDerivativeOp::new(0, mesher)
            .into_inner()
            .mult(&(&v * 0.5));

        let drift_v = v.map(|vi| kappa * (theta - vi));
        let dy_base = SecondDerivativeOp::new(1, mesher)
            .into_inner()
            .mult(&(&v * (0.5 * sigma * sigma)))
            .add(&FirstDerivativeOp::new(1, mesher).into_inner().mult(&drift_v));

        let correlation = NinePointLinearOp::new(0, 1, mesher).mult(&(&v * (rho * sigma)));

        let dx_map = second_x_half_v.clone();
        let dy_map = dy_base.clone();
        let mut op = Self {
            process: process.clone(),
            v,
            first_x,
            second_x_half_v,
            dy_base,
            correlation,
            dx_map,
            dy_map,
        };
        op.set_time(0.0, 1.0 / 365.0);
        op
    }
}

impl FdmLinearOpComposite for FdmHestonOp {
    fn size(&self) -> Size {
        self.v.size()
    }

    fn directions(&self) -> Size {
        2
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let r = self.process.risk_free_rate().forward_rate(t1, t2);
        let q = self.process.dividend_yield().forward_rate(t1, t2);
        let drift_x = self.v.map(|vi| r - q - 0.5 * vi);
        self.dx_map = self
            .second_x_half_v
            .add(&self.first_x.mult(&drift_x))
            .add_identity(-0.5 * r);
        self.dy_map = self.dy_base.add_identity(-0.5 * r);
    }

    fn apply(&self, u: &Array) -> Array {
        self.dx_map.apply(u) + self.dy_map.apply(u) + self.correlation.apply(u)
    }

    fn apply_direction(&self, d: Size, u: &Array) -> Array {
        match d {
            0 => self.dx_map.apply(u),
            1 => self.dy_map.apply(u),
            _ => unreachable!("the Heston operator has two directions"),
        }
    }

    fn apply_mixed(&self, u: &Array) -> Array {
        self.correlation.apply(u)
    }

    fn solve_splitting(&self, d: Size, r: &Array, s: Real) -> Array {
        match d {
            0 => self.dx_map.solve_splitting(r, s, 1.0),
            1 => self.dy_map.solve_splitting(r, s, 1.0),
            _ => unreachable!("the Heston operator has two directions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::mesher::Mesher1d;
    use approx::assert_abs_diff_eq;
    use hfd_termstructures::{FlatForward, YieldTermStructure};

    fn setup() -> (Arc<FdmMesherComposite>, HestonProcess) {
        let rate: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.05));
        let div: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.02));
        let process =
            HestonProcess::new(rate, div, 100.0, 0.04, 2.0, 0.05, 0.4, -0.6).unwrap();
        let mx = Mesher1d::uniform(3.8, 5.4, 21).unwrap();
        let mv = Mesher1d::predefined(&[0.01, 0.02, 0.04, 0.07, 0.11, 0.16, 0.22]).unwrap();
        let mesher = Arc::new(FdmMesherComposite::new(vec![Arc::new(mx), Arc::new(mv)]));
        (mesher, process)
    }

    #[test]
    fn matches_the_pde_on_separable_quadratics() {
        let (mesher, process) = setup();
        let mut op = FdmHestonOp::new(&mesher, &process);
        op.set_time(0.0, 0.1);
        let r = 0.05;
        let q = 0.02;
        let (kappa, theta) = (process.kappa(), process.theta());

        // u = a x² + b v is quadratic in x and linear in v, so every stencil
        // is exact at interior nodes and the mixed term vanishes.
        let (a, b) = (0.7, 1.3);
        let layout = mesher.layout().clone();
        let u = Array::from_vec(
            (0..layout.size())
                .map(|i| a * mesher.location(i, 0).powi(2) + b * mesher.location(i, 1))
                .collect(),
        );
        let lu = op.apply(&u);
        for i in 0..layout.size() {
            let cx = layout.coordinate(i, 0);
            let cv = layout.coordinate(i, 1);
            if cx == 0 || cx == layout.dim_size(0) - 1 || cv == 0 || cv == layout.dim_size(1) - 1 {
                continue;
            }
            let x = mesher.location(i, 0);
            let v = mesher.location(i, 1);
            let expected = 0.5 * v * 2.0 * a
                + (r - q - 0.5 * v) * 2.0 * a * x
                + kappa * (theta - v) * b
                - r * (a * x * x + b * v);
            assert_abs_diff_eq!(lu[i], expected, epsilon = 1e-10);
        }
    }

    #[test]
    fn directional_parts_sum_to_the_full_operator() {
        let (mesher, process) = setup();
        let mut op = FdmHestonOp::new(&mesher, &process);
        op.set_time(0.0, 0.5);
        let n = mesher.layout().size();
        let u = Array::from_vec((0..n).map(|i| (0.13 * i as Real).cos()).collect());
        let total = op.apply(&u);
        let parts =
            op.apply_direction(0, &u) + op.apply_direction(1, &u) + op.apply_mixed(&u);
        for i in 0..n {
            assert_abs_diff_eq!(total[i], parts[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn solve_splitting_inverts_the_directional_step() {
        let (mesher, process) = setup();
        let mut op = FdmHestonOp::new(&mesher, &process);
        op.set_time(0.0, 0.5);
        let n = mesher.layout().size();
        let rhs = Array::from_vec((0..n).map(|i| 1.0 + (0.21 * i as Real).sin()).collect());
        for d in 0..2 {
            let s = -0.005;
            let x = op.solve_splitting(d, &rhs, s);
            let back = op.apply_direction(d, &x) * s + &x;
            for i in 0..n {
                assert_abs_diff_eq!(back[i], rhs[i], epsilon = 1e-10);
            }
        }
    }
}
