//! Non-uniform one-dimensional meshers and their tensor-product composite.

use std::sync::Arc;

use hfd_core::{ensure, errors::Result, Real, Size, Time};
use hfd_math::distributions::normal_cdf_inverse;
use hfd_processes::{HestonProcess, SquareRootProcess};

use super::layout::FdmLinearOpLayout;

/// A point the mesh should cluster around.
#[derive(Debug, Clone, Copy)]
pub struct CriticalPoint {
    /// Coordinate of the point.
    pub location: Real,
    /// Clustering strength; larger means a tighter mesh around the point.
    pub density: Real,
    /// Whether a grid node must coincide exactly with the point.
    pub must_hit: bool,
}

impl CriticalPoint {
    /// Convenience constructor.
    pub fn new(location: Real, density: Real, must_hit: bool) -> Self {
        Self { location, density, must_hit }
    }
}

/// A one-dimensional, strictly increasing coordinate axis together with the
/// forward and backward node spacings used by the difference stencils.
#[derive(Debug, Clone)]
pub struct Mesher1d {
    locations: Vec<Real>,
    dplus: Vec<Real>,
    dminus: Vec<Real>,
}

impl Mesher1d {
    fn from_locations(locations: Vec<Real>) -> Result<Self> {
        ensure!(
            locations.len() >= 4,
            InvalidGrid,
            "a mesh needs at least 4 points, got {}",
            locations.len()
        );
        for w in locations.windows(2) {
            ensure!(
                w[1] > w[0],
                InvalidGrid,
                "mesh locations must be strictly increasing, got {} after {}",
                w[1],
                w[0]
            );
        }
        let n = locations.len();
        let mut dplus = vec![Real::NAN; n];
        let mut dminus = vec![Real::NAN; n];
        for i in 0..n - 1 {
            dplus[i] = locations[i + 1] - locations[i];
            dminus[i + 1] = dplus[i];
        }
        Ok(Self { locations, dplus, dminus })
    }

    /// Equally spaced mesh on `[start, end]`.
    pub fn uniform(start: Real, end: Real, size: Size) -> Result<Self> {
        ensure!(size >= 4, InvalidGrid, "a mesh needs at least 4 points, got {size}");
        ensure!(end > start, InvalidGrid, "empty mesh interval [{start}, {end}]");
        let h = (end - start) / (size - 1) as Real;
        let mut locations: Vec<Real> = (0..size).map(|i| start + i as Real * h).collect();
        locations[size - 1] = end;
        Self::from_locations(locations)
    }

    /// Mesh from caller-supplied, strictly increasing locations.
    pub fn predefined(locations: &[Real]) -> Result<Self> {
        Self::from_locations(locations.to_vec())
    }

    /// Mesh on `[start, end]` clustered around the given critical points via
    /// the sinh/asinh reparameterisation. Several points are blended by a
    /// density-weighted convex combination of the individual transforms;
    /// `must_hit` is realised by snapping the nearest interior node.
    pub fn concentrating(
        start: Real,
        end: Real,
        size: Size,
        points: &[CriticalPoint],
    ) -> Result<Self> {
        ensure!(size >= 4, InvalidGrid, "a mesh needs at least 4 points, got {size}");
        ensure!(end > start, InvalidGrid, "empty mesh interval [{start}, {end}]");
        ensure!(!points.is_empty(), InvalidGrid, "no critical points given");
        for p in points {
            ensure!(
                p.location >= start && p.location <= end,
                InvalidGrid,
                "critical point {} outside mesh interval [{start}, {end}]",
                p.location
            );
            ensure!(p.density > 0.0, InvalidGrid, "density must be positive, got {}", p.density);
        }

        let locations = if points.len() == 1 && points[0].must_hit {
            Self::single_point_grid(start, end, size, &points[0])
        } else {
            let weight_sum: Real = points.iter().map(|p| p.density).sum();
            let mut locations = vec![0.0; size];
            for p in points {
                let grid = Self::sinh_grid(start, end, size, p.location, 1.0 / p.density);
                let w = p.density / weight_sum;
                for (x, g) in locations.iter_mut().zip(&grid) {
                    *x += w * g;
                }
            }
            locations[0] = start;
            locations[size - 1] = end;
            for p in points.iter().filter(|p| p.must_hit) {
                Self::snap_nearest(&mut locations, p.location);
            }
            locations
        };

        Self::from_locations(locations)
    }

    fn sinh_grid(start: Real, end: Real, size: Size, point: Real, scale: Real) -> Vec<Real> {
        let c1 = ((start - point) / scale).asinh();
        let c2 = ((end - point) / scale).asinh();
        let mut grid: Vec<Real> = (0..size)
            .map(|i| {
                let u = i as Real / (size - 1) as Real;
                point + scale * (c1 * (1.0 - u) + c2 * u).sinh()
            })
            .collect();
        grid[0] = start;
        grid[size - 1] = end;
        grid
    }

    // Piecewise-linear remap of the uniform parameter so that one interior
    // node lands exactly on the critical point.
    fn single_point_grid(start: Real, end: Real, size: Size, p: &CriticalPoint) -> Vec<Real> {
        let scale = 1.0 / p.density;
        let c1 = ((start - p.location) / scale).asinh();
        let c2 = ((end - p.location) / scale).asinh();
        let u_star = (-c1 / (c2 - c1)).clamp(0.0, 1.0);
        let n1 = (size - 1) as Real;
        let i0 = ((u_star * n1).round() as Size).clamp(1, size - 2);
        let u0 = i0 as Real / n1;
        let mut grid: Vec<Real> = (0..size)
            .map(|i| {
                let u = i as Real / n1;
                let t = if u <= u0 {
                    u / u0 * u_star
                } else {
                    u_star + (u - u0) / (1.0 - u0) * (1.0 - u_star)
                };
                p.location + scale * (c1 + t * (c2 - c1)).sinh()
            })
            .collect();
        grid[0] = start;
        grid[size - 1] = end;
        grid[i0] = p.location;
        grid
    }

    fn snap_nearest(locations: &mut [Real], point: Real) {
        let n = locations.len();
        let mut best = 1;
        for i in 1..n - 1 {
            if (locations[i] - point).abs() < (locations[best] - point).abs() {
                best = i;
            }
        }
        locations[best] = point;
    }

    /// Number of nodes.
    pub fn size(&self) -> Size {
        self.locations.len()
    }

    /// The node coordinates.
    pub fn locations(&self) -> &[Real] {
        &self.locations
    }

    /// Coordinate of node `i`.
    pub fn location(&self, i: Size) -> Real {
        self.locations[i]
    }

    /// Forward spacing `x[i+1] - x[i]`; `NaN` at the last node.
    pub fn dplus(&self, i: Size) -> Real {
        self.dplus[i]
    }

    /// Backward spacing `x[i] - x[i-1]`; `NaN` at the first node.
    pub fn dminus(&self, i: Size) -> Real {
        self.dminus[i]
    }
}

// ── Composite mesher ──────────────────────────────────────────────────────

/// One `Mesher1d` per dimension plus the flat-index layout.
#[derive(Debug, Clone)]
pub struct FdmMesherComposite {
    layout: FdmLinearOpLayout,
    meshers: Vec<Arc<Mesher1d>>,
}

impl FdmMesherComposite {
    /// Build the composite from per-dimension meshers.
    pub fn new(meshers: Vec<Arc<Mesher1d>>) -> Self {
        let layout = FdmLinearOpLayout::new(meshers.iter().map(|m| m.size()).collect());
        Self { layout, meshers }
    }

    /// Convenience constructor for a single dimension.
    pub fn from_mesher(mesher: Mesher1d) -> Self {
        Self::new(vec![Arc::new(mesher)])
    }

    /// The flat-index layout.
    pub fn layout(&self) -> &FdmLinearOpLayout {
        &self.layout
    }

    /// The one-dimensional mesher of dimension `d`.
    pub fn mesher(&self, d: Size) -> &Mesher1d {
        &self.meshers[d]
    }

    /// Coordinate of flat node `i` along dimension `d`.
    pub fn location(&self, i: Size, d: Size) -> Real {
        self.meshers[d].location(self.layout.coordinate(i, d))
    }

    /// Forward spacing at flat node `i` along dimension `d`.
    pub fn dplus(&self, i: Size, d: Size) -> Real {
        self.meshers[d].dplus(self.layout.coordinate(i, d))
    }

    /// Backward spacing at flat node `i` along dimension `d`.
    pub fn dminus(&self, i: Size, d: Size) -> Real {
        self.meshers[d].dminus(self.layout.coordinate(i, d))
    }

    /// The coordinates of all nodes along dimension `d`, over the full layout.
    pub fn locations(&self, d: Size) -> Vec<Real> {
        (0..self.layout.size()).map(|i| self.location(i, d)).collect()
    }
}

// ── Problem-specific mesh builders ────────────────────────────────────────

/// Variance mesh from time-averaged noncentral chi-square quantiles of the
/// square-root process, together with the derived average-volatility
/// estimate used to size the log-spot mesh.
#[derive(Debug, Clone)]
pub struct FdmHestonVarianceMesher {
    mesher: Mesher1d,
    vola_estimate: Real,
}

impl FdmHestonVarianceMesher {
    /// Build the variance mesh for the given process and maturity.
    pub fn new(size: Size, process: &HestonProcess, maturity: Time) -> Result<Self> {
        const T_AVG_STEPS: Size = 10;
        const EPSILON: Real = 1e-4;

        let kappa = process.kappa();
        let theta = process.theta();
        let v0 = process.v0();
        let sqp = SquareRootProcess::new(kappa, theta, process.sigma().max(1e-8))?;

        // Average the quantile grids of the transition law over a handful of
        // intermediate horizons so short- and long-dated mass both get nodes.
        let mut grid = vec![0.0; size];
        for l in 1..=T_AVG_STEPS {
            let t = l as Real / T_AVG_STEPS as Real * maturity;
            for (i, g) in grid.iter_mut().enumerate() {
                let p = EPSILON + (1.0 - 2.0 * EPSILON) * i as Real / (size - 1) as Real;
                *g += sqp.transition_quantile(v0, t, p)? / T_AVG_STEPS as Real;
            }
        }
        // Keep the initial variance inside the mesh.
        grid[0] = grid[0].min(0.5 * v0.max(1e-8));
        let top = grid[size - 1].max(1.25 * v0);
        if top > grid[size - 1] {
            grid[size - 1] = top;
        }
        for i in 1..size {
            if grid[i] <= grid[i - 1] {
                grid[i] = grid[i - 1] * (1.0 + 1e-8) + 1e-12;
            }
        }

        let decay = (-kappa * maturity).exp();
        let vola_estimate = (theta + (v0 - theta) * (1.0 - decay) / (kappa * maturity)).sqrt();

        Ok(Self {
            mesher: Mesher1d::predefined(&grid)?,
            vola_estimate,
        })
    }

    /// The variance axis.
    pub fn mesher(&self) -> &Mesher1d {
        &self.mesher
    }

    /// Consume into the underlying axis.
    pub fn into_mesher(self) -> Mesher1d {
        self.mesher
    }

    /// Square root of the maturity-averaged expected variance.
    pub fn vola_estimate(&self) -> Real {
        self.vola_estimate
    }
}

/// Log-spot mesh from Black-Scholes-style quantile bounds, clustered at a
/// critical log-price (the strike for backward pricing, the spot for forward
/// densities).
///
/// The optional `x_min`/`x_max` overrides clip the mesh, e.g. at a knock-out
/// barrier that becomes a grid boundary.
#[allow(clippy::too_many_arguments)]
pub fn black_scholes_log_mesher(
    size: Size,
    spot: Real,
    vola_estimate: Real,
    maturity: Time,
    drift: Real,
    critical_log_price: Real,
    x_min: Option<Real>,
    x_max: Option<Real>,
) -> Result<Mesher1d> {
    const EPSILON: Real = 1e-4;
    let norm_inv = normal_cdf_inverse(1.0 - EPSILON);
    let half_width = 1.5 * vola_estimate * maturity.sqrt() * norm_inv;
    let forward = spot.ln() + drift * maturity;
    let mut lo = x_min.unwrap_or(forward - half_width);
    let mut hi = x_max.unwrap_or(forward + half_width);
    lo = lo.min(spot.ln() - 1e-4);
    hi = hi.max(spot.ln() + 1e-4);
    let point = critical_log_price.clamp(lo, hi);
    Mesher1d::concentrating(lo, hi, size, &[CriticalPoint::new(point, 10.0, point == critical_log_price)])
}
