//! Forward (Fokker-Planck) density engine for European options under the
//! Heston model.
//!
//! The joint density of log-spot and (transformed) variance is seeded from
//! the short-time Green's function, evolved forward with an ADI scheme and
//! integrated against the payoff at maturity. The variance transform is
//! chosen from the Feller ratio unless overridden, so that densities with an
//! integrable singularity at the origin stay representable on the grid.

use std::sync::Arc;

use hfd_core::{ensure, errors::Result, Real, Size};
use hfd_instruments::{
    ExerciseType, PricingEngine, PricingResults, VanillaOptionArguments,
};
use hfd_math::Array;
use hfd_methods::{
    black_scholes_log_mesher, mesher_integral, BoundarySet, FdmHestonFwdOp, FdmHestonGreensFct,
    FdmHestonVarianceMesher, FdmMesherComposite, FdmSchemeDesc, FokkerPlanckSolver,
    GreensFctAlgorithm, Mesher1d, TransformationType,
};
use hfd_processes::HestonProcess;
use tracing::debug;

/// Prices European vanillas by evolving the joint Heston density forward.
#[derive(Debug, Clone)]
pub struct FdHestonForwardEngine {
    process: HestonProcess,
    time_steps: Size,
    x_grid: Size,
    v_grid: Size,
    transform: Option<TransformationType>,
    greens_algorithm: GreensFctAlgorithm,
    scheme: FdmSchemeDesc,
}

impl FdHestonForwardEngine {
    /// Engine with the given grid resolution, the Feller-ratio transform
    /// heuristic, Gaussian density seeding and the Douglas scheme.
    pub fn new(process: HestonProcess, time_steps: Size, x_grid: Size, v_grid: Size) -> Self {
        Self {
            process,
            time_steps,
            x_grid,
            v_grid,
            transform: None,
            greens_algorithm: GreensFctAlgorithm::Gaussian,
            scheme: FdmSchemeDesc::douglas(),
        }
    }

    /// Force a particular variance transform instead of the heuristic.
    pub fn with_transform(mut self, transform: TransformationType) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Select the Green's-function seeding algorithm.
    pub fn with_greens_algorithm(mut self, algorithm: GreensFctAlgorithm) -> Self {
        self.greens_algorithm = algorithm;
        self
    }

    /// Select the time-stepping scheme.
    pub fn with_scheme(mut self, scheme: FdmSchemeDesc) -> Self {
        self.scheme = scheme;
        self
    }

    /// The transform the engine will use for the given maturity.
    pub fn resolved_transform(&self) -> TransformationType {
        self.transform
            .unwrap_or_else(|| TransformationType::for_feller_ratio(self.process.feller_ratio()))
    }
}

impl PricingEngine<VanillaOptionArguments> for FdHestonForwardEngine {
    fn calculate(&self, args: &VanillaOptionArguments) -> Result<PricingResults> {
        let maturity = args.exercise.maturity();
        ensure!(
            maturity > 0.0,
            InvalidParameter,
            "cannot evolve a density to a non-positive maturity {maturity}"
        );
        ensure!(
            args.exercise.exercise_type() == ExerciseType::European,
            InvalidParameter,
            "the forward density engine prices European exercise only"
        );
        ensure!(
            args.dividends.is_empty(),
            InvalidParameter,
            "the forward density engine does not support discrete dividends"
        );

        let transform = self.resolved_transform();
        let s0 = self.process.s0();

        let variance_mesher =
            FdmHestonVarianceMesher::new(self.v_grid, &self.process, maturity)?;
        let vola_estimate = variance_mesher.vola_estimate();
        let v_axis = match transform {
            TransformationType::Log => {
                let zs: Vec<Real> = variance_mesher
                    .mesher()
                    .locations()
                    .iter()
                    .map(|&v| v.ln())
                    .collect();
                Mesher1d::predefined(&zs)?
            }
            _ => variance_mesher.into_mesher(),
        };

        // the density engine concentrates the log-spot mesh at the spot,
        // where all the early mass sits
        let drift = self.process.risk_free_rate().forward_rate(0.0, maturity)
            - self.process.dividend_yield().forward_rate(0.0, maturity);
        let x_axis = black_scholes_log_mesher(
            self.x_grid,
            s0,
            vola_estimate,
            maturity,
            drift,
            s0.ln(),
            None,
            None,
        )?;
        let mesher = Arc::new(FdmMesherComposite::new(vec![
            Arc::new(x_axis),
            Arc::new(v_axis),
        ]));

        let op = FdmHestonFwdOp::new(&mesher, &self.process, transform)?;
        let v = op.v().clone();
        let alpha = op.v_op().alpha();

        // seed at a small positive time where the kernel is resolvable
        let dt = maturity / self.time_steps as Real;
        let t0 = (0.02 * maturity).max(dt);
        let greens =
            FdmHestonGreensFct::new(Arc::clone(&mesher), self.process.clone(), transform);
        let mut density = greens.get(t0, self.greens_algorithm)?;

        debug!(
            ?transform,
            t0,
            time_steps = self.time_steps,
            "evolving the joint density forward"
        );
        let mut solver =
            FokkerPlanckSolver::new(Box::new(op), BoundarySet::new(), self.scheme);
        solver.evolve(&mut density, t0, maturity, self.time_steps);

        // undo the Power transform before quadrature; the Log density is
        // integrated directly in the z coordinate
        let integrand = Array::from_vec(
            (0..mesher.layout().size())
                .map(|i| {
                    let payoff = args.payoff.value(mesher.location(i, 0).exp());
                    let weight = match transform {
                        TransformationType::Power => density[i] * v[i].powf(-alpha),
                        _ => density[i],
                    };
                    payoff * weight
                })
                .collect(),
        );
        let expectation = mesher_integral(&mesher, &integrand);
        let npv = self.process.risk_free_rate().discount(maturity) * expectation;

        Ok(PricingResults::from_npv(npv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hfd_instruments::{Exercise, OptionType, PlainVanillaPayoff};
    use hfd_termstructures::{FlatForward, YieldTermStructure};

    fn process(sigma: Real) -> HestonProcess {
        let r: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.01));
        let q: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.02));
        HestonProcess::new(r, q, 100.0, 0.05, 1.0, 0.05, sigma, -0.75).unwrap()
    }

    #[test]
    fn transform_heuristic_follows_the_feller_ratio() {
        let engine = FdHestonForwardEngine::new(process(0.2), 10, 20, 10);
        assert_eq!(engine.resolved_transform(), TransformationType::Plain);
        let engine = FdHestonForwardEngine::new(process(0.5), 10, 20, 10);
        assert_eq!(engine.resolved_transform(), TransformationType::Power);
        let engine = FdHestonForwardEngine::new(process(2.0), 10, 20, 10);
        assert_eq!(engine.resolved_transform(), TransformationType::Log);
        let engine = engine.with_transform(TransformationType::Plain);
        assert_eq!(engine.resolved_transform(), TransformationType::Plain);
    }

    #[test]
    fn rejects_american_exercise_and_dividends() {
        let engine = FdHestonForwardEngine::new(process(0.2), 10, 20, 10);
        let payoff = Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0));
        let american =
            VanillaOptionArguments::new(payoff.clone(), Exercise::american(1.0));
        assert!(engine.calculate(&american).is_err());
        let with_dividends = VanillaOptionArguments::new(payoff, Exercise::european(1.0))
            .with_dividends(vec![(0.5, 1.0)]);
        assert!(engine.calculate(&with_dividends).is_err());
    }

    #[test]
    fn recovers_the_undiscounted_forward_from_the_identity_payoff() {
        // a zero-strike call pays S_T, whose discounted expectation is the
        // dividend-discounted spot
        let process = process(0.2);
        let engine = FdHestonForwardEngine::new(process.clone(), 50, 200, 50);
        let args = VanillaOptionArguments::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Call, 0.0)),
            Exercise::european(1.0),
        );
        let results = engine.calculate(&args).unwrap();
        let expected = 100.0 * process.dividend_yield().discount(1.0);
        assert!((results.npv - expected).abs() / expected < 0.02);
    }
}
