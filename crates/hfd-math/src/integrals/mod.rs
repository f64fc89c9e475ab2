//! Numerical quadrature.
//!
//! The adaptive composite Simpson rule drives the characteristic-function
//! integration of the semi-analytic Heston oracle; the discrete rules in
//! [`discrete`] integrate grid functions produced by the forward solver.

pub mod discrete;

pub use discrete::{discrete_simpson, discrete_trapezoid};

use hfd_core::Real;
use tracing::warn;

/// A numerical integrator over a finite interval.
pub trait Integrator {
    /// Integrate `f` on `[a, b]`.
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Real;
}

// ── Simpson ───────────────────────────────────────────────────────────────────

/// Composite Simpson rule with successive refinement.
///
/// Doubles the panel count until two successive estimates agree to within the
/// requested absolute accuracy.  Hitting the evaluation cap is non-fatal: the
/// last estimate is returned and a warning is logged.
#[derive(Debug, Clone)]
pub struct SimpsonIntegral {
    absolute_accuracy: Real,
    max_evaluations: usize,
}

impl SimpsonIntegral {
    /// Create a new Simpson integrator.
    pub fn new(absolute_accuracy: Real, max_evaluations: usize) -> Self {
        Self {
            absolute_accuracy,
            max_evaluations,
        }
    }
}

impl Integrator for SimpsonIntegral {
    fn integrate<F: Fn(Real) -> Real>(&self, f: F, a: Real, b: Real) -> Real {
        if a == b {
            return 0.0;
        }
        let fa = f(a);
        let fb = f(b);
        let mut n = 1usize;
        let mut old_value = Real::MAX;
        let mut evals = 2;

        loop {
            let h = (b - a) / (2.0 * n as Real);
            let mut sum_odd = 0.0;
            let mut sum_even = 0.0;
            for i in 1..2 * n {
                let fx = f(a + i as Real * h);
                if i % 2 == 1 {
                    sum_odd += fx;
                } else {
                    sum_even += fx;
                }
            }
            evals += 2 * n - 1;
            let value = h / 3.0 * (fa + 4.0 * sum_odd + 2.0 * sum_even + fb);

            if n > 1 && (value - old_value).abs() < self.absolute_accuracy {
                return value;
            }
            if evals >= self.max_evaluations {
                warn!(
                    evaluations = evals,
                    estimate = value,
                    "Simpson quadrature hit its evaluation cap before reaching tolerance"
                );
                return value;
            }
            old_value = value;
            n *= 2;
        }
    }
}
