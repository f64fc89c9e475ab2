//! The forward (Fokker-Planck) Heston operator.

use std::sync::Arc;

use hfd_core::{errors::Result, Real, Size, Time};
use hfd_math::Array;
use hfd_processes::HestonProcess;

use super::square_root_fwd_op::{FdmSquareRootFwdOp, TransformationType};
use super::FdmLinearOpComposite;
use crate::finite_differences::mesher::FdmMesherComposite;
use crate::finite_differences::nine_point::NinePointLinearOp;
use crate::finite_differences::triple_band::{
    FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp,
};

/// Spatial generator of the Heston Fokker-Planck equation on a
/// (log-spot, variance) grid, composing the x-direction adjoint, the
/// square-root variance operator and the transformation-aware mixed term.
///
/// The density is undiscounted; discounting happens at read-out.
pub struct FdmHestonFwdOp {
    process: HestonProcess,
    v: Array,
    first_x: TripleBandLinearOp,
    second_x_half_v: TripleBandLinearOp,
    v_op: FdmSquareRootFwdOp,
    mixed: NinePointLinearOp,
    dx_map: TripleBandLinearOp,
}

impl FdmHestonFwdOp {
    /// Build the operator; dimension 0 is log-spot, dimension 1 the
    /// (possibly log-transformed) variance.
    pub fn new(
        mesher: &Arc<FdmMesherComposite>,
        process: &HestonProcess,
        transform: TransformationType,
    ) -> Result<Self> {
        let v_op = FdmSquareRootFwdOp::new(
            mesher,
            process.kappa(),
            process.theta(),
            process.sigma(),
            1,
            transform,
        )?;
        let v = v_op.v().clone();
        let rho_sigma = process.rho() * process.sigma();

        let nine = NinePointLinearOp::new(0, 1, mesher);
        let mixed = match transform {
            TransformationType::Plain => nine.mult_r(&(&v * rho_sigma)),
            TransformationType::Power => {
                let alpha = v_op.alpha();
                nine.mult_r(&v.map(|vi| rho_sigma * vi.powf(1.0 - alpha)))
                    .mult(&v.powf(alpha))
            }
            _ => nine.scale(rho_sigma),
        };

        let first_x = FirstDerivativeOp::new(0, mesher).into_inner();
        let second_x_half_v = SecondDerivativeOp::new(0, mesher)
            .into_inner()
            .mult(&(&v * 0.5));

        let dx_map = second_x_half_v.clone();
        let mut op = Self {
            process: process.clone(),
            v,
            first_x,
            second_x_half_v,
            v_op,
            mixed,
            dx_map,
        };
        op.set_time(0.0, 1.0 / 365.0);
        Ok(op)
    }

    /// The variance value at each node.
    pub fn v(&self) -> &Array {
        &self.v
    }

    /// The variance-direction operator.
    pub fn v_op(&self) -> &FdmSquareRootFwdOp {
        &self.v_op
    }
}

impl FdmLinearOpComposite for FdmHestonFwdOp {
    fn size(&self) -> Size {
        self.v.size()
    }

    fn directions(&self) -> Size {
        2
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let r = self.process.risk_free_rate().forward_rate(t1, t2);
        let q = self.process.dividend_yield().forward_rate(t1, t2);
        // adjoint of ½v ∂xx + (r-q-½v) ∂x
        let drift_x = self.v.map(|vi| 0.5 * vi - (r - q));
        self.dx_map = self.second_x_half_v.add(&self.first_x.mult(&drift_x));
    }

    fn apply(&self, u: &Array) -> Array {
        self.dx_map.apply(u) + self.v_op.map().apply(u) + self.mixed.apply(u)
    }

    fn apply_direction(&self, d: Size, u: &Array) -> Array {
        match d {
            0 => self.dx_map.apply(u),
            1 => self.v_op.map().apply(u),
            _ => unreachable!("the forward Heston operator has two directions"),
        }
    }

    fn apply_mixed(&self, u: &Array) -> Array {
        self.mixed.apply(u)
    }

    fn solve_splitting(&self, d: Size, r: &Array, s: Real) -> Array {
        match d {
            0 => self.dx_map.solve_splitting(r, s, 1.0),
            1 => self.v_op.map().solve_splitting(r, s, 1.0),
            _ => unreachable!("the forward Heston operator has two directions"),
        }
    }
}
