//! The ADI operator-splitting scheme family.
//!
//! Every scheme advances a grid function over one time step of length
//! `|t_to - t_from|`; the same formulas serve the backward (pricing) and
//! forward (density) solvers, only the sign convention of the interval
//! differs.

use hfd_core::{Real, Time};
use hfd_math::Array;

use super::boundary::{apply_boundary_set, BoundarySet};
use super::operators::FdmLinearOpComposite;

/// Identifies a time-stepping scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdmSchemeType {
    /// Forward Euler, conditionally stable.
    ExplicitEuler,
    /// Fully implicit Douglas sweep (θ = 1), used for damping.
    ImplicitEuler,
    /// Douglas splitting.
    Douglas,
    /// Craig-Sneyd with mixed-derivative corrector.
    CraigSneyd,
    /// Modified Craig-Sneyd corrector.
    ModifiedCraigSneyd,
    /// Hundsdorfer-Verwer two-sweep scheme.
    Hundsdorfer,
}

/// A scheme together with its splitting parameters.
#[derive(Debug, Clone, Copy)]
pub struct FdmSchemeDesc {
    /// The scheme family.
    pub scheme_type: FdmSchemeType,
    /// Implicitness parameter θ.
    pub theta: Real,
    /// Mixed-derivative corrector weight μ.
    pub mu: Real,
}

impl FdmSchemeDesc {
    /// Douglas scheme, θ = ½.
    pub fn douglas() -> Self {
        Self { scheme_type: FdmSchemeType::Douglas, theta: 0.5, mu: 0.0 }
    }

    /// Fully implicit damping scheme.
    pub fn implicit_euler() -> Self {
        Self { scheme_type: FdmSchemeType::ImplicitEuler, theta: 1.0, mu: 0.0 }
    }

    /// Explicit Euler.
    pub fn explicit_euler() -> Self {
        Self { scheme_type: FdmSchemeType::ExplicitEuler, theta: 0.0, mu: 0.0 }
    }

    /// Craig-Sneyd, θ = ½, μ = ½.
    pub fn craig_sneyd() -> Self {
        Self { scheme_type: FdmSchemeType::CraigSneyd, theta: 0.5, mu: 0.5 }
    }

    /// Modified Craig-Sneyd, θ = μ = ⅓.
    pub fn modified_craig_sneyd() -> Self {
        Self {
            scheme_type: FdmSchemeType::ModifiedCraigSneyd,
            theta: 1.0 / 3.0,
            mu: 1.0 / 3.0,
        }
    }

    /// Hundsdorfer-Verwer, θ = ½ + √3/6, μ = ½.
    pub fn hundsdorfer() -> Self {
        Self {
            scheme_type: FdmSchemeType::Hundsdorfer,
            theta: 0.5 + 3.0f64.sqrt() / 6.0,
            mu: 0.5,
        }
    }

    /// Hundsdorfer-Verwer variant, θ = 1 - √2/2, μ = ½.
    pub fn modified_hundsdorfer() -> Self {
        Self {
            scheme_type: FdmSchemeType::Hundsdorfer,
            theta: 1.0 - 2.0f64.sqrt() / 2.0,
            mu: 0.5,
        }
    }

    /// Advance `a` over `[t_from, t_to]`.
    pub fn step(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        bc: &BoundarySet,
        a: &mut Array,
        t_from: Time,
        t_to: Time,
    ) {
        match self.scheme_type {
            FdmSchemeType::ExplicitEuler => ExplicitEulerScheme.step(op, bc, a, t_from, t_to),
            FdmSchemeType::ImplicitEuler => {
                DouglasScheme { theta: 1.0 }.step(op, bc, a, t_from, t_to)
            }
            FdmSchemeType::Douglas => {
                DouglasScheme { theta: self.theta }.step(op, bc, a, t_from, t_to)
            }
            FdmSchemeType::CraigSneyd => CraigSneydScheme { theta: self.theta, mu: self.mu }
                .step(op, bc, a, t_from, t_to),
            FdmSchemeType::ModifiedCraigSneyd => {
                ModifiedCraigSneydScheme { theta: self.theta, mu: self.mu }
                    .step(op, bc, a, t_from, t_to)
            }
            FdmSchemeType::Hundsdorfer => HundsdorferScheme { theta: self.theta, mu: self.mu }
                .step(op, bc, a, t_from, t_to),
        }
    }
}

fn prepare(op: &mut dyn FdmLinearOpComposite, t_from: Time, t_to: Time) -> Real {
    let (lo, hi) = if t_from < t_to { (t_from, t_to) } else { (t_to, t_from) };
    op.set_time(lo, hi);
    hi - lo
}

fn implicit_sweep(
    op: &dyn FdmLinearOpComposite,
    mut y: Array,
    lhs: &Array,
    theta: Real,
    dt: Real,
) -> Array {
    for d in 0..op.directions() {
        let rhs = y - &(op.apply_direction(d, lhs) * (theta * dt));
        y = op.solve_splitting(d, &rhs, -theta * dt);
    }
    y
}

/// Forward Euler step `a ← a + Δt·L a`.
pub struct ExplicitEulerScheme;

impl ExplicitEulerScheme {
    /// Advance `a` over `[t_from, t_to]`.
    pub fn step(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        bc: &BoundarySet,
        a: &mut Array,
        t_from: Time,
        t_to: Time,
    ) {
        let dt = prepare(op, t_from, t_to);
        let mut y = &*a + &(op.apply(a) * dt);
        apply_boundary_set(bc, &mut y);
        *a = y;
    }
}

/// Douglas splitting: explicit predictor, one implicit sweep per direction.
pub struct DouglasScheme {
    /// Implicitness parameter θ.
    pub theta: Real,
}

impl DouglasScheme {
    /// Advance `a` over `[t_from, t_to]`.
    pub fn step(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        bc: &BoundarySet,
        a: &mut Array,
        t_from: Time,
        t_to: Time,
    ) {
        let dt = prepare(op, t_from, t_to);
        let mut y = &*a + &(op.apply(a) * dt);
        apply_boundary_set(bc, &mut y);
        let mut y = implicit_sweep(op, y, a, self.theta, dt);
        apply_boundary_set(bc, &mut y);
        *a = y;
    }
}

/// Craig-Sneyd: a Douglas step followed by a mixed-derivative corrector and
/// a second implicit sweep.
pub struct CraigSneydScheme {
    /// Implicitness parameter θ.
    pub theta: Real,
    /// Corrector weight μ.
    pub mu: Real,
}

impl CraigSneydScheme {
    /// Advance `a` over `[t_from, t_to]`.
    pub fn step(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        bc: &BoundarySet,
        a: &mut Array,
        t_from: Time,
        t_to: Time,
    ) {
        let dt = prepare(op, t_from, t_to);
        let mut y0 = &*a + &(op.apply(a) * dt);
        apply_boundary_set(bc, &mut y0);
        let y = implicit_sweep(op, y0.clone(), a, self.theta, dt);
        let mut yt = &y0 + &(op.apply_mixed(&(&y - a)) * (self.mu * dt));
        apply_boundary_set(bc, &mut yt);
        let mut yt = implicit_sweep(op, yt, a, self.theta, dt);
        apply_boundary_set(bc, &mut yt);
        *a = yt;
    }
}

/// Modified Craig-Sneyd: the corrector also re-weights the full operator.
pub struct ModifiedCraigSneydScheme {
    /// Implicitness parameter θ.
    pub theta: Real,
    /// Corrector weight μ.
    pub mu: Real,
}

impl ModifiedCraigSneydScheme {
    /// Advance `a` over `[t_from, t_to]`.
    pub fn step(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        bc: &BoundarySet,
        a: &mut Array,
        t_from: Time,
        t_to: Time,
    ) {
        let dt = prepare(op, t_from, t_to);
        let mut y0 = &*a + &(op.apply(a) * dt);
        apply_boundary_set(bc, &mut y0);
        let y = implicit_sweep(op, y0.clone(), a, self.theta, dt);
        let diff = &y - a;
        let mut yt = &y0
            + &(op.apply_mixed(&diff) * (self.mu * dt))
            + &(op.apply(&diff) * ((0.5 - self.mu) * dt));
        apply_boundary_set(bc, &mut yt);
        let mut yt = implicit_sweep(op, yt, a, self.theta, dt);
        apply_boundary_set(bc, &mut yt);
        *a = yt;
    }
}

/// Hundsdorfer-Verwer: the second sweep linearises around the predictor.
pub struct HundsdorferScheme {
    /// Implicitness parameter θ.
    pub theta: Real,
    /// Corrector weight μ.
    pub mu: Real,
}

impl HundsdorferScheme {
    /// Advance `a` over `[t_from, t_to]`.
    pub fn step(
        &self,
        op: &mut dyn FdmLinearOpComposite,
        bc: &BoundarySet,
        a: &mut Array,
        t_from: Time,
        t_to: Time,
    ) {
        let dt = prepare(op, t_from, t_to);
        let mut y0 = &*a + &(op.apply(a) * dt);
        apply_boundary_set(bc, &mut y0);
        let y = implicit_sweep(op, y0.clone(), a, self.theta, dt);
        let mut yt = &y0 + &(op.apply(&(&y - a)) * (self.mu * dt));
        apply_boundary_set(bc, &mut yt);
        let mut yt = implicit_sweep(op, yt, &y, self.theta, dt);
        apply_boundary_set(bc, &mut yt);
        *a = yt;
    }
}
