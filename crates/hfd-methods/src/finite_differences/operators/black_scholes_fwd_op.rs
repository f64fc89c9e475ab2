//! One-dimensional forward (Fokker-Planck) Black-Scholes operator.

use std::sync::Arc;

use hfd_core::{Real, Size, Time};
use hfd_math::Array;
use hfd_termstructures::YieldTermStructure;

use super::FdmLinearOpComposite;
use crate::finite_differences::mesher::FdmMesherComposite;
use crate::finite_differences::triple_band::{
    FirstDerivativeOp, SecondDerivativeOp, TripleBandLinearOp,
};

/// Fokker-Planck operator of the log-spot density under constant volatility,
///
/// ```text
/// ∂t p = ½σ² ∂xx p - (r - q - ½σ²) ∂x p
/// ```
///
/// used to validate the Dirac-seeded density machinery in one dimension.
/// The density is undiscounted.
pub struct FdmBlackScholesFwdOp {
    rate: Arc<dyn YieldTermStructure>,
    dividend: Arc<dyn YieldTermStructure>,
    sigma: Real,
    first: TripleBandLinearOp,
    second_half: TripleBandLinearOp,
    map: TripleBandLinearOp,
}

impl FdmBlackScholesFwdOp {
    /// Build the operator on a one-dimensional log-spot mesher.
    pub fn new(
        mesher: &Arc<FdmMesherComposite>,
        rate: Arc<dyn YieldTermStructure>,
        dividend: Arc<dyn YieldTermStructure>,
        sigma: Real,
    ) -> Self {
        let first = FirstDerivativeOp::new(0, mesher).into_inner();
        let second_half = SecondDerivativeOp::new(0, mesher)
            .into_inner()
            .scale(0.5 * sigma * sigma);
        let map = second_half.clone();
        let mut op = Self { rate, dividend, sigma, first, second_half, map };
        op.set_time(0.0, 1.0 / 365.0);
        op
    }
}

impl FdmLinearOpComposite for FdmBlackScholesFwdOp {
    fn size(&self) -> Size {
        self.map.size()
    }

    fn directions(&self) -> Size {
        1
    }

    fn set_time(&mut self, t1: Time, t2: Time) {
        let r = self.rate.forward_rate(t1, t2);
        let q = self.dividend.forward_rate(t1, t2);
        let drift = 0.5 * self.sigma * self.sigma - (r - q);
        self.map = self.second_half.add(&self.first.scale(drift));
    }

    fn apply(&self, u: &Array) -> Array {
        self.map.apply(u)
    }

    fn apply_direction(&self, d: Size, u: &Array) -> Array {
        debug_assert_eq!(d, 0);
        self.map.apply(u)
    }

    fn apply_mixed(&self, u: &Array) -> Array {
        Array::zeros(u.size())
    }

    fn solve_splitting(&self, d: Size, r: &Array, s: Real) -> Array {
        debug_assert_eq!(d, 0);
        self.map.solve_splitting(r, s, 1.0)
    }
}
