//! The composite linear operators the ADI schemes advance in time.

use hfd_core::{Real, Size, Time};
use hfd_math::Array;

/// One-dimensional forward (Fokker-Planck) Black-Scholes generator.
pub mod black_scholes_fwd_op;
/// Forward (Fokker-Planck) Heston generator.
pub mod heston_fwd_op;
/// Backward Heston generator.
pub mod heston_op;
/// Forward square-root-process generator with variance transforms.
pub mod square_root_fwd_op;

/// A multi-dimensional spatial operator split by direction for ADI stepping.
///
/// `set_time` refreshes time-dependent coefficients (forward rates over the
/// step interval) and is called once per time step before the scheme uses
/// the operator.
pub trait FdmLinearOpComposite {
    /// Number of grid nodes the operator acts on.
    fn size(&self) -> Size;

    /// Number of directions the operator splits into.
    fn directions(&self) -> Size;

    /// Refresh coefficients for the step over `[t1, t2]`, `t1 < t2`.
    fn set_time(&mut self, t1: Time, t2: Time);

    /// Apply the full operator including the mixed term.
    fn apply(&self, u: &Array) -> Array;

    /// Apply the directional part `L_d` only.
    fn apply_direction(&self, d: Size, u: &Array) -> Array;

    /// Apply the mixed-derivative part only.
    fn apply_mixed(&self, u: &Array) -> Array;

    /// Solve `(I + s·L_d) x = r`.
    fn solve_splitting(&self, d: Size, r: &Array, s: Real) -> Array;
}
