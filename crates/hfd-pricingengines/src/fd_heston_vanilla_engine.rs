//! Backward finite-difference engine for European and American vanillas
//! under the Heston model.
//!
//! The terminal payoff is rolled back on a non-uniform (log-spot, variance)
//! grid with an ADI splitting scheme; early exercise and discrete cash
//! dividends are handled as step conditions. NPV, delta and gamma are read
//! off a bicubic spline fitted to the solved grid.

use std::sync::Arc;

use hfd_core::{ensure, errors::Result, Real, Size, Time};
use hfd_instruments::{
    ExerciseType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use hfd_math::Array;
use hfd_methods::{
    black_scholes_log_mesher, AmericanExerciseCondition, BoundarySet, DividendCondition,
    Fdm2dSolution, FdmBackwardSolver, FdmHestonOp, FdmHestonVarianceMesher, FdmMesherComposite,
    FdmSchemeDesc, FdmStepConditionComposite,
};
use hfd_processes::HestonProcess;
use tracing::debug;

/// Prices vanillas by rolling the payoff back through the two-dimensional
/// Heston pricing PDE.
#[derive(Debug, Clone)]
pub struct FdHestonVanillaEngine {
    process: HestonProcess,
    time_steps: Size,
    x_grid: Size,
    v_grid: Size,
    damping_steps: Size,
    scheme: FdmSchemeDesc,
}

impl FdHestonVanillaEngine {
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

    /// Prepend fully implicit damping steps that smooth the payoff kink.
    pub fn with_damping_steps(mut self, damping_steps: Size) -> Self {
        self.damping_steps = damping_steps;
        self
    }

    /// Select the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }

    fn build_mesher(
        &self,
        maturity: Time,
        strike: Real,
    ) -> Result<Arc<FdmMesherComposite>> {
        let variance_mesher =
            FdmHestonVarianceMesher::new(self.v_grid, &self.process, maturity)?;
        let drift = self.process.risk_free_rate().forward_rate(0.0, maturity)
            - self.process.dividend_yield().forward_rate(0.0, maturity);
        let x_mesher = black_scholes_log_mesher(
            self.x_grid,
            self.process.s0(),
            variance_mesher.vola_estimate(),
            maturity,
            drift,
            strike.ln(),
            None,
            None,
        )?;
        Ok(Arc::new(FdmMesherComposite::new(vec![
            Arc::new(x_mesher),
            Arc::new(variance_mesher.into_mesher()),
        ])))
    }
}

impl PricingEngine<VanillaOptionArguments> for FdHestonVanillaEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = args.exercise.maturity();
        ensure!(
            maturity > 0.0,
            InvalidParameter,
            "cannot roll back to a non-positive maturity {maturity}"
        );

        let mesher = self.build_mesher(maturity, args.payoff.strike())?;
        let intrinsic = Array::from_vec(
            (0..mesher.layout().size())
                .map(|i| args.payoff.value(mesher.location(i, 0).exp()))
                .collect(),
        );
        let mut values = intrinsic.clone();

        let mut condition = FdmStepConditionComposite::new();
        if !args.dividends.is_empty() {
            condition.push(Box::new(DividendCondition::new(
                Arc::clone(&mesher),
                args.dividends.clone(),
            )));
        }
        if args.exercise.exercise_type() == ExerciseType::American {
            condition.push(Box::new(AmericanExerciseCondition::new(intrinsic)));
        }

        debug!(
            time_steps = self.time_steps,
            x_grid = self.x_grid,
            v_grid = self.v_grid,
            "pricing vanilla on the backward grid"
        );
        let op = FdmHestonOp::new(&mesher, &self.process);
        let mut solver =
            FdmBackwardSolver::new(Box::new(op), BoundarySet::new(), condition, self.scheme);
        solver.rollback(&mut values, maturity, 0.0, self.time_steps, self.damping_steps);

        let solution = Fdm2dSolution::new(&mesher, &values)?;
        let s0 = self.process.s0();
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
    use crate::analytic_heston_engine::heston_price;
    use approx::assert_abs_diff_eq;
    use hfd_instruments::{Exercise, OptionType, PlainVanillaPayoff};
    use hfd_termstructures::{FlatForward, YieldTermStructure};

    fn process() -> HestonProcess {
        let r: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.05));
        let q: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.0));
        HestonProcess::new(r, q, 100.0, 0.04, 2.5, 0.04, 0.66, -0.8).unwrap()
    }

    #[test]
    fn european_put_matches_the_semi_analytic_price() {
        let process = process();
        let expected = heston_price(&process, OptionType::Put, 100.0, 1.0);
        let engine = FdHestonVanillaEngine::new(process, 100, 200, 50);
        let args = VanillaOptionArguments::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
            Exercise::european(1.0),
        );
        let results = engine.calculate(&args).unwrap();
        assert_abs_diff_eq!(results.npv, expected, epsilon = 0.01);
    }

    #[test]
    fn american_put_dominates_the_european_put() {
        let process = process();
        let engine = FdHestonVanillaEngine::new(process, 50, 100, 25);
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
        let european = engine
            .calculate(&VanillaOptionArguments::new(
                payoff.clone(),
                Exercise::european(1.0),
            ))
            .unwrap();
        let american = engine
            .calculate(&VanillaOptionArguments::new(
                payoff,
                Exercise::american(1.0),
            ))
            .unwrap();
        assert!(american.npv > european.npv);
    }

    #[test]
    fn rejects_an_expired_exercise() {
        let engine = FdHestonVanillaEngine::new(process(), 10, 20, 10);
        let args = VanillaOptionArguments::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Exercise::european(0.0),
        );
        assert!(engine.calculate(&args).is_err());
    }

    #[test]
    fn reports_delta_and_gamma() {
        let engine = FdHestonVanillaEngine::new(process(), 50, 100, 25);
        let args = VanillaOptionArguments::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 100.0)),
            Exercise::european(1.0),
        );
        let results = engine.calculate(&args).unwrap();
        let delta = results.additional_results["delta"];
        let gamma = results.additional_results["gamma"];
        assert!(delta > 0.0 && delta < 1.0);
        assert!(gamma > 0.0);
    }
}
