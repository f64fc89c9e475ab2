//! Conditions applied to the grid function between time steps.

use std::sync::Arc;

use hfd_core::{Real, Time};
use hfd_math::interpolations::{Interpolation1D, LinearInterpolation};
use hfd_math::Array;

use super::mesher::FdmMesherComposite;

const TIME_TOLERANCE: Time = 1e-10;

/// A transformation applied to the grid function after each rollback step.
pub trait StepCondition {
    /// Transform `a` at solver time `t`.
    fn apply_to(&self, a: &mut Array, t: Time);

    /// Times the rollback must hit exactly for this condition to fire.
    fn stopping_times(&self) -> Vec<Time> {
        Vec::new()
    }
}

/// American early exercise: floor the value at the intrinsic payoff after
/// every step.
pub struct AmericanExerciseCondition {
    intrinsic: Array,
}

impl AmericanExerciseCondition {
    /// `intrinsic` is the payoff evaluated on the full layout.
    pub fn new(intrinsic: Array) -> Self {
        Self { intrinsic }
    }
}

impl StepCondition for AmericanExerciseCondition {
    fn apply_to(&self, a: &mut Array, _t: Time) {
        for i in 0..a.size() {
            if self.intrinsic[i] > a[i] {
                a[i] = self.intrinsic[i];
            }
        }
    }
}

/// Discrete cash dividends: at each dividend time, shift the value function
/// along the log-spot axis by linear interpolation, so that
/// `V(x, t⁻) = V(ln(eˣ - D), t⁺)`.
pub struct DividendCondition {
    mesher: Arc<FdmMesherComposite>,
    schedule: Vec<(Time, Real)>,
}

impl DividendCondition {
    /// `schedule` holds `(time, cash amount)` pairs.
    pub fn new(mesher: Arc<FdmMesherComposite>, schedule: Vec<(Time, Real)>) -> Self {
        Self { mesher, schedule }
    }

    fn shift(&self, a: &mut Array, amount: Real) {
        let layout = self.mesher.layout().clone();
        let nx = layout.dim_size(0);
        let xs: Vec<Real> = (0..nx).map(|k| self.mesher.mesher(0).location(k)).collect();
        let lowest = xs[0].exp();
        for base in layout.line_starts(0) {
            let ys: Vec<Real> = (0..nx).map(|k| a[base + k]).collect();
            let interp = LinearInterpolation::new(&xs, &ys)
                .expect("log-spot axis is a valid interpolation grid");
            for (k, &x) in xs.iter().enumerate() {
                let shifted = (x.exp() - amount).max(lowest).ln();
                a[base + k] = interp.value(shifted);
            }
        }
    }
}

impl StepCondition for DividendCondition {
    fn apply_to(&self, a: &mut Array, t: Time) {
        for &(td, amount) in &self.schedule {
            if (td - t).abs() < TIME_TOLERANCE {
                self.shift(a, amount);
            }
        }
    }

    fn stopping_times(&self) -> Vec<Time> {
        self.schedule.iter().map(|&(t, _)| t).collect()
    }
}

/// An ordered set of step conditions applied one after the other.
#[derive(Default)]
pub struct FdmStepConditionComposite {
    conditions: Vec<Box<dyn StepCondition>>,
}

impl FdmStepConditionComposite {
    /// An empty composite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition; conditions fire in insertion order.
    pub fn push(&mut self, condition: Box<dyn StepCondition>) {
        self.conditions.push(condition);
    }

    /// True when no condition is registered.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Union of the mandatory stopping times of all conditions.
    pub fn stopping_times(&self) -> Vec<Time> {
        let mut times: Vec<Time> = self
            .conditions
            .iter()
            .flat_map(|c| c.stopping_times())
            .collect();
        times.sort_by(|a, b| a.partial_cmp(b).expect("stopping times are finite"));
        times.dedup_by(|a, b| (*a - *b).abs() < TIME_TOLERANCE);
        times
    }

    /// Apply all conditions at solver time `t`.
    pub fn apply_to(&self, a: &mut Array, t: Time) {
        for c in &self.conditions {
            c.apply_to(a, t);
        }
    }
}
