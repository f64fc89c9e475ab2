//! Backward (pricing) solver: event-aware rollback plus spline read-out.

use std::sync::Arc;

use hfd_core::{ensure, errors::Result, Real, Time};
use hfd_math::interpolations::BicubicSpline;
use hfd_math::Array;
use tracing::debug;

use super::boundary::BoundarySet;
use super::mesher::FdmMesherComposite;
use super::operators::FdmLinearOpComposite;
use super::schemes::FdmSchemeDesc;
use super::step_conditions::FdmStepConditionComposite;

const TIME_TOLERANCE: Time = 1e-10;

/// Rolls a terminal value function back through time with an ADI scheme,
/// applying step conditions and hitting every event time exactly.
pub struct FdmBackwardSolver {
    op: Box<dyn FdmLinearOpComposite>,
    bc: BoundarySet,
    condition: FdmStepConditionComposite,
    scheme: FdmSchemeDesc,
}

impl FdmBackwardSolver {
    /// Assemble a solver.
    pub fn new(
        op: Box<dyn FdmLinearOpComposite>,
        bc: BoundarySet,
        condition: FdmStepConditionComposite,
        scheme: FdmSchemeDesc,
    ) -> Self {
        Self { op, bc, condition, scheme }
    }

    /// Roll `a` back from `from` to `to` (`from > to`) in `steps` scheme
    /// steps, preceded by `damping_steps` fully implicit steps that smooth
    /// the non-smooth terminal condition.
    pub fn rollback(
        &mut self,
        a: &mut Array,
        from: Time,
        to: Time,
        steps: usize,
        damping_steps: usize,
    ) {
        debug_assert!(from > to);
        let all_steps = steps + damping_steps;
        let delta = (from - to) / all_steps as Real;
        let damping_to = from - delta * damping_steps as Real;

        // descending time grid: damping segment, then uniform scheme steps
        // with the mandatory stopping times spliced in
        let mut times: Vec<Time> = Vec::with_capacity(all_steps + 4);
        times.push(from);
        for k in 1..=damping_steps {
            times.push(from - delta * k as Real);
        }
        let h = (damping_to - to) / steps as Real;
        for k in 1..=steps {
            times.push(damping_to - h * k as Real);
        }
        for t in self.condition.stopping_times() {
            if t > to + TIME_TOLERANCE && t < from - TIME_TOLERANCE {
                times.push(t);
            }
        }
        times.sort_by(|x, y| y.partial_cmp(x).expect("time grid is finite"));
        times.dedup_by(|x, y| (*x - *y).abs() < TIME_TOLERANCE);

        debug!(steps = times.len() - 1, damping_steps, "rolling back value function");
        let implicit = FdmSchemeDesc::implicit_euler();
        for w in 0..times.len() - 1 {
            let (t1, t2) = (times[w], times[w + 1]);
            let desc = if t2 > damping_to - TIME_TOLERANCE && damping_steps > 0 {
                &implicit
            } else {
                &self.scheme
            };
            desc.step(self.op.as_mut(), &self.bc, a, t1, t2);
            self.condition.apply_to(a, t2);
        }
    }
}

// ── Read-out ──────────────────────────────────────────────────────────────

/// Bicubic-spline view of a two-dimensional solution used to read values
/// and log-spot derivatives at off-grid points.
pub struct Fdm2dSolution {
    spline: BicubicSpline,
    x_range: (Real, Real),
    v_range: (Real, Real),
}

impl Fdm2dSolution {
    /// Fit the spline over the (x, v) grid of `mesher`.
    pub fn new(mesher: &Arc<FdmMesherComposite>, values: &Array) -> Result<Self> {
        ensure!(
            mesher.layout().dim() == 2,
            InvalidGrid,
            "the spline read-out needs a two-dimensional layout"
        );
        let xs = mesher.mesher(0).locations().to_vec();
        let vs = mesher.mesher(1).locations().to_vec();
        let spline = BicubicSpline::new(&xs, &vs, values.as_slice())?;
        Ok(Self {
            spline,
            x_range: (xs[0], xs[xs.len() - 1]),
            v_range: (vs[0], vs[vs.len() - 1]),
        })
    }

    fn check_domain(&self, x: Real, v: Real) -> Result<()> {
        ensure!(
            x >= self.x_range.0 && x <= self.x_range.1 && v >= self.v_range.0 && v <= self.v_range.1,
            DomainInsufficient,
            "evaluation point ({x}, {v}) lies outside the solved grid \
             [{}, {}] x [{}, {}]",
            self.x_range.0,
            self.x_range.1,
            self.v_range.0,
            self.v_range.1
        );
        Ok(())
    }

    /// Solution value at `(x, v)`.
    pub fn value_at(&self, x: Real, v: Real) -> Result<Real> {
        self.check_domain(x, v)?;
        self.spline.value(x, v)
    }

    /// First derivative along x at `(x, v)`.
    pub fn dx_at(&self, x: Real, v: Real) -> Result<Real> {
        self.check_domain(x, v)?;
        self.spline.derivative_x(x, v)
    }

    /// Second derivative along x at `(x, v)`.
    pub fn dxx_at(&self, x: Real, v: Real) -> Result<Real> {
        self.check_domain(x, v)?;
        self.spline.second_derivative_x(x, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finite_differences::mesher::Mesher1d;
    use crate::finite_differences::operators::heston_op::FdmHestonOp;
    use crate::finite_differences::step_conditions::{DividendCondition, StepCondition};
    use approx::assert_abs_diff_eq;
    use hfd_core::Size;
    use hfd_math::Array as Grid;
    use hfd_processes::HestonProcess;
    use hfd_termstructures::{FlatForward, YieldTermStructure};

    struct RecordingCondition {
        times: std::rc::Rc<std::cell::RefCell<Vec<Time>>>,
        mandatory: Vec<Time>,
    }

    impl StepCondition for RecordingCondition {
        fn apply_to(&self, _a: &mut Grid, t: Time) {
            self.times.borrow_mut().push(t);
        }
        fn stopping_times(&self) -> Vec<Time> {
            self.mandatory.clone()
        }
    }

    fn heston_op(nx: Size, nv: Size) -> (Arc<FdmMesherComposite>, FdmHestonOp) {
        let r: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.05));
        let q: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.0));
        let process = HestonProcess::new(r, q, 100.0, 0.04, 2.0, 0.04, 0.3, -0.5).unwrap();
        let mx = Mesher1d::uniform(4.0, 5.2, nx).unwrap();
        let mv = Mesher1d::uniform(0.01, 0.2, nv).unwrap();
        let mesher = Arc::new(FdmMesherComposite::new(vec![Arc::new(mx), Arc::new(mv)]));
        let op = FdmHestonOp::new(&mesher, &process);
        (mesher, op)
    }

    #[test]
    fn rollback_hits_every_stopping_time() {
        let (mesher, op) = heston_op(10, 5);
        let mut condition = FdmStepConditionComposite::new();
        let recorder = RecordingCondition {
            times: std::rc::Rc::new(std::cell::RefCell::new(Vec::new())),
            mandatory: vec![0.101, 0.777],
        };
        let times_handle = std::rc::Rc::clone(&recorder.times);
        condition.push(Box::new(recorder));
        let mut solver = FdmBackwardSolver::new(
            Box::new(op),
            BoundarySet::new(),
            condition,
            FdmSchemeDesc::douglas(),
        );
        let mut a = Grid::zeros(mesher.layout().size());
        solver.rollback(&mut a, 1.0, 0.0, 10, 2);
        let seen = times_handle.borrow().clone();
        assert!(seen.iter().any(|&t| (t - 0.101).abs() < 1e-9));
        assert!(seen.iter().any(|&t| (t - 0.777).abs() < 1e-9));
        assert_abs_diff_eq!(*seen.last().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn constant_terminal_value_decays_at_the_risk_free_rate() {
        let (mesher, op) = heston_op(40, 20);
        let mut solver = FdmBackwardSolver::new(
            Box::new(op),
            BoundarySet::new(),
            FdmStepConditionComposite::new(),
            FdmSchemeDesc::douglas(),
        );
        let mut a = Grid::from_element(mesher.layout().size(), 1.0);
        solver.rollback(&mut a, 1.0, 0.0, 100, 0);
        // V = 1 has no spatial structure, so only the -r term acts
        let layout = mesher.layout().clone();
        for i in 0..layout.size() {
            let cx = layout.coordinate(i, 0);
            let cv = layout.coordinate(i, 1);
            if cx < 3 || cx > layout.dim_size(0) - 4 || cv < 2 || cv > layout.dim_size(1) - 3 {
                continue;
            }
            assert_abs_diff_eq!(a[i], (-0.05f64).exp(), epsilon = 1e-4);
        }
    }

    #[test]
    fn spline_read_out_reproduces_grid_values() {
        let (mesher, _) = heston_op(20, 10);
        let layout = mesher.layout().clone();
        let values = Grid::from_vec(
            (0..layout.size())
                .map(|i| mesher.location(i, 0) * 2.0 + mesher.location(i, 1))
                .collect(),
        );
        let solution = Fdm2dSolution::new(&mesher, &values).unwrap();
        assert_abs_diff_eq!(solution.value_at(4.5, 0.1).unwrap(), 9.1, epsilon = 1e-10);
        assert_abs_diff_eq!(solution.dx_at(4.5, 0.1).unwrap(), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(solution.dxx_at(4.5, 0.1).unwrap(), 0.0, epsilon = 1e-8);
        assert!(solution.value_at(10.0, 0.1).is_err());
    }
}
