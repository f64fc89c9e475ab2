//! Forward-equation machinery: Dirac seeding, grid quadrature, the
//! short-time Green's function and the density evolution driver.

use std::sync::Arc;

use hfd_core::{ensure, errors::Result, Real, Time};
use hfd_math::distributions::normal_pdf;
use hfd_math::integrals::discrete_simpson;
use hfd_math::Array;
use hfd_processes::{HestonProcess, SquareRootProcess};
use tracing::debug;

use super::boundary::BoundarySet;
use super::mesher::{FdmMesherComposite, Mesher1d};
use super::operators::square_root_fwd_op::TransformationType;
use super::operators::FdmLinearOpComposite;
use super::schemes::FdmSchemeDesc;

/// Discrete approximation of a unit point mass at `x0`: the mass is split
/// over the two bracketing nodes in proportion to proximity and divided by
/// the trapezoid cell widths, so the grid integral is one and the mean `x0`.
pub fn dirac_delta(mesher: &Mesher1d, x0: Real) -> Result<Array> {
    let xs = mesher.locations();
    let n = xs.len();
    ensure!(
        x0 >= xs[0] && x0 <= xs[n - 1],
        InvalidParameter,
        "point mass location {x0} outside the mesh [{}, {}]",
        xs[0],
        xs[n - 1]
    );
    let j = xs.partition_point(|&x| x <= x0).saturating_sub(1).min(n - 2);
    let w = (xs[j + 1] - x0) / (xs[j + 1] - xs[j]);

    let cell = |i: usize| -> Real {
        let lo = if i == 0 { xs[0] } else { 0.5 * (xs[i - 1] + xs[i]) };
        let hi = if i == n - 1 { xs[n - 1] } else { 0.5 * (xs[i] + xs[i + 1]) };
        hi - lo
    };

    let mut p = Array::zeros(n);
    p[j] = w / cell(j);
    p[j + 1] = (1.0 - w) / cell(j + 1);
    Ok(p)
}

/// Integrate a grid function over the composite mesher with the non-uniform
/// Simpson rule, dimension by dimension.
pub fn mesher_integral(mesher: &FdmMesherComposite, f: &Array) -> Real {
    let layout = mesher.layout();
    match layout.dim() {
        1 => discrete_simpson(mesher.mesher(0).locations(), f.as_slice()),
        2 => {
            let nx = layout.dim_size(0);
            let nv = layout.dim_size(1);
            let xs = mesher.mesher(0).locations();
            let vs = mesher.mesher(1).locations();
            let rows: Vec<Real> = (0..nv)
                .map(|j| {
                    let row: Vec<Real> = (0..nx).map(|i| f[j * nx + i]).collect();
                    discrete_simpson(xs, &row)
                })
                .collect();
            discrete_simpson(vs, &rows)
        }
        d => unreachable!("no quadrature for {d}-dimensional layouts"),
    }
}

/// Which closed form seeds the joint density at a small positive time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreensFctAlgorithm {
    /// Correlated bivariate normal around the short-time means.
    Gaussian,
    /// Product of a normal in x and the exact CIR transition density,
    /// ignoring the correlation over the seeding interval.
    ZeroCorrelation,
}

/// Short-time Green's function of the Heston Fokker-Planck equation,
/// expressed in the operator's transformed variance variable.
pub struct FdmHestonGreensFct {
    mesher: Arc<FdmMesherComposite>,
    process: HestonProcess,
    transform: TransformationType,
}

impl FdmHestonGreensFct {
    /// Bind the Green's function to a mesher, process and transform.
    pub fn new(
        mesher: Arc<FdmMesherComposite>,
        process: HestonProcess,
        transform: TransformationType,
    ) -> Self {
        Self { mesher, process, transform }
    }

    /// The joint density at time `t` on the full layout.
    pub fn get(&self, t: Time, algorithm: GreensFctAlgorithm) -> Result<Array> {
        let p = &self.process;
        let x0 = p.s0().ln();
        let v0 = p.v0();
        let r = p.risk_free_rate().forward_rate(0.0, t);
        let q = p.dividend_yield().forward_rate(0.0, t);
        let kappa = p.kappa();
        let theta = p.theta();
        let sigma = p.sigma();
        let rho = p.rho();
        let alpha = 1.0 - 2.0 * kappa * theta / (sigma * sigma);

        let mean_x = x0 + (r - q - 0.5 * v0) * t;
        let sd_x = (v0 * t).sqrt();
        let cir = SquareRootProcess::new(kappa, theta, sigma)?;

        let layout = self.mesher.layout().clone();
        let mut density = Array::zeros(layout.size());
        for i in 0..layout.size() {
            let x = self.mesher.location(i, 0);
            let coord_v = self.mesher.location(i, 1);
            let v = match self.transform {
                TransformationType::Log => coord_v.exp(),
                _ => coord_v,
            };

            let joint = match algorithm {
                GreensFctAlgorithm::Gaussian => {
                    let mean_v = v0 + kappa * (theta - v0) * t;
                    let sd_v = sigma * (v0 * t).sqrt();
                    let dx = (x - mean_x) / sd_x;
                    let dv = (v - mean_v) / sd_v;
                    let c = 1.0 - rho * rho;
                    ((-0.5 / c) * (dx * dx - 2.0 * rho * dx * dv + dv * dv)).exp()
                        / (2.0 * std::f64::consts::PI * sd_x * sd_v * c.sqrt())
                }
                GreensFctAlgorithm::ZeroCorrelation => {
                    normal_pdf((x - mean_x) / sd_x) / sd_x * cir.transition_pdf(v0, t, v)
                }
            };

            density[i] = match self.transform {
                TransformationType::Power => joint * v.powf(alpha),
                TransformationType::Log => joint * v,
                _ => joint,
            };
        }
        Ok(density)
    }
}

/// Evolves a density forward in time with an ADI scheme.
pub struct FokkerPlanckSolver {
    op: Box<dyn FdmLinearOpComposite>,
    bc: BoundarySet,
    scheme: FdmSchemeDesc,
}

impl FokkerPlanckSolver {
    /// Assemble a forward solver.
    pub fn new(op: Box<dyn FdmLinearOpComposite>, bc: BoundarySet, scheme: FdmSchemeDesc) -> Self {
        Self { op, bc, scheme }
    }

    /// Advance `p` from `from` to `to` (`from < to`) in `steps` equal steps.
    pub fn evolve(&mut self, p: &mut Array, from: Time, to: Time, steps: usize) {
        debug_assert!(from < to);
        let dt = (to - from) / steps as Real;
        debug!(steps, dt, "evolving density forward");
        for k in 0..steps {
            let t = from + k as Real * dt;
            self.scheme.step(self.op.as_mut(), &self.bc, p, t, t + dt);
        }
    }
}
