//! Backward finite-difference engine for knock-out barrier options under
//! the Heston model.
//!
//! The barrier becomes a grid boundary: the log-spot mesh is clipped at the
//! barrier level and a Dirichlet condition pins the edge to the rebate while
//! the payoff is rolled back.

use std::sync::Arc;

use hfd_core::{ensure, errors::Result, Size};
use hfd_instruments::{
    BarrierOptionArguments, BarrierType, ExerciseType, PricingEngine, PricingResults,
};
use hfd_math::Array;
use hfd_methods::{
    apply_boundary_set, black_scholes_log_mesher, AmericanExerciseCondition, BoundarySet,
    BoundarySide, Fdm2dSolution, FdmBackwardSolver, FdmDirichletBoundary, FdmHestonOp,
    FdmHestonVarianceMesher, FdmMesherComposite, FdmSchemeDesc, FdmStepConditionComposite,
};
use hfd_processes::HestonProcess;
use tracing::debug;

/// Prices single-barrier knock-outs on a grid whose log-spot axis ends at
/// the barrier.
#[derive(Debug, Clone)]
pub struct FdHestonBarrierEngine {
    process: HestonProcess,
    time_steps: Size,
    x_grid: Size,
    v_grid: Size,
    damping_steps: Size,
    scheme: FdmSchemeDesc,
}

impl FdHestonBarrierEngine {
    /// Engine with the given grid resolution, no damping and the Douglas
    /// scheme.
    pub fn new(process: HestonProcess, time_steps: Size, x_grid: Size, v_grid: Size) -> Self {
        Self {
            process,
            time_steps,
            x_grid,
            v_grid,
            damping_steps: 0,
            scheme: FdmSchemeDesc::douglas(),
        }
    }

    /// Prepend fully implicit damping steps.
    pub fn with_damping_steps(mut self, damping_steps: Size) -> Self {
        self.damping_steps = damping_steps;
        self
    }

    /// Select the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }
}

impl PricingEngine<BarrierOptionArguments> for FdHestonBarrierEngine {
    fn calculate(&self, args: &BarrierOptionArguments) -> Result<PricingResults> {
        let maturity = args.exercise.maturity();
        ensure!(
            maturity > 0.0,
            InvalidParameter,
            "cannot roll back to a non-positive maturity {maturity}"
        );
        let s0 = self.process.s0();

        // already knocked out
        let knocked_out = match args.barrier_type {
            BarrierType::DownOut => s0 <= args.barrier,
            BarrierType::UpOut => s0 >= args.barrier,
        };
        if knocked_out {
            return Ok(PricingResults::from_npv(args.rebate)
                .with_result("delta", 0.0)
                .with_result("gamma", 0.0));
        }

        let variance_mesher =
            FdmHestonVarianceMesher::new(self.v_grid, &self.process, maturity)?;
        let drift = self.process.risk_free_rate().forward_rate(0.0, maturity)
            - self.process.dividend_yield().forward_rate(0.0, maturity);
        let barrier_log = args.barrier.ln();
        let (x_min, x_max, side) = match args.barrier_type {
            BarrierType::DownOut => (Some(barrier_log), None, BoundarySide::Lower),
            BarrierType::UpOut => (None, Some(barrier_log), BoundarySide::Upper),
        };
        let x_mesher = black_scholes_log_mesher(
            self.x_grid,
            s0,
            variance_mesher.vola_estimate(),
            maturity,
            drift,
            args.payoff.strike().ln(),
            x_min,
            x_max,
        )?;
        let mesher = Arc::new(FdmMesherComposite::new(vec![
            Arc::new(x_mesher),
            Arc::new(variance_mesher.into_mesher()),
        ]));

        let bc: BoundarySet =
            vec![FdmDirichletBoundary::new(&mesher, args.rebate, 0, side)];

        let intrinsic = Array::from_vec(
            (0..mesher.layout().size())
                .map(|i| args.payoff.value(mesher.location(i, 0).exp()))
                .collect(),
        );
        let mut values = intrinsic.clone();
        apply_boundary_set(&bc, &mut values);

        let mut condition = FdmStepConditionComposite::new();
        if args.exercise.exercise_type() == ExerciseType::American {
            condition.push(Box::new(AmericanExerciseCondition::new(intrinsic)));
        }

        debug!(
            barrier = args.barrier,
            time_steps = self.time_steps,
            "pricing knock-out on the clipped backward grid"
        );
        let op = FdmHestonOp::new(&mesher, &self.process);
        let mut solver = FdmBackwardSolver::new(Box::new(op), bc, condition, self.scheme);
        solver.rollback(&mut values, maturity, 0.0, self.time_steps, self.damping_steps);

        let solution = Fdm2dSolution::new(&mesher, &values)?;
        let x0 = s0.ln();
        let v0 = self.process.v0();

        let npv = solution.value_at(x0, v0)?;
        let dx = solution.dx_at(x0, v0)?;
        let dxx = solution.dxx_at(x0, v0)?;

        Ok(PricingResults::from_npv(npv)
            .with_result("delta", dx / s0)
            .with_result("gamma", (dxx - dx) / (s0 * s0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use hfd_instruments::{Exercise, OptionType, PlainVanillaPayoff};
    use hfd_termstructures::{FlatForward, YieldTermStructure};

    fn process() -> HestonProcess {
        let r: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.05));
        let q: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.0));
        HestonProcess::new(r, q, 100.0, 0.04, 2.5, 0.04, 0.66, -0.8).unwrap()
    }

    fn barrier_args(barrier_type: BarrierType, barrier: f64) -> BarrierOptionArguments {
        BarrierOptionArguments {
            payoff: Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            exercise: Exercise::european(1.0),
            barrier_type,
            barrier,
            rebate: 0.0,
        }
    }

    #[test]
    fn knocked_out_spot_returns_the_rebate() {
        let engine = FdHestonBarrierEngine::new(process(), 10, 20, 10);
        let mut args = barrier_args(BarrierType::UpOut, 90.0);
        args.rebate = 1.5;
        let results = engine.calculate(&args).unwrap();
        assert_abs_diff_eq!(results.npv, 1.5, epsilon = 1e-14);
    }

    #[test]
    fn tighter_barrier_is_worth_less() {
        let engine = FdHestonBarrierEngine::new(process(), 50, 100, 25);
        let loose = engine
            .calculate(&barrier_args(BarrierType::UpOut, 160.0))
            .unwrap();
        let tight = engine
            .calculate(&barrier_args(BarrierType::UpOut, 120.0))
            .unwrap();
        assert!(tight.npv < loose.npv);
        assert!(tight.npv > 0.0);
    }

    #[test]
    fn up_and_out_call_has_negative_gamma_near_the_barrier() {
        let engine = FdHestonBarrierEngine::new(process(), 50, 200, 50);
        let results = engine
            .calculate(&barrier_args(BarrierType::UpOut, 115.0))
            .unwrap();
        assert!(results.additional_results["gamma"] < 0.0);
    }
}
