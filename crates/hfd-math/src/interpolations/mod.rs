//! 1-D interpolation: linear and natural cubic splines.

use hfd_core::{ensure, errors::Result, Real};

pub mod bicubic;

pub use bicubic::BicubicSpline;

/// A 1-D interpolation function defined by a set of known points.
pub trait Interpolation1D: std::fmt::Debug {
    /// Evaluate the interpolation at `x`.
    fn value(&self, x: Real) -> Real;

    /// Lower bound of the interpolation domain.
    fn x_min(&self) -> Real;

    /// Upper bound of the interpolation domain.
    fn x_max(&self) -> Real;

    /// Return `true` if `x` is within the interpolation range.
    fn is_in_range(&self, x: Real) -> bool {
        x >= self.x_min() && x <= self.x_max()
    }
}

/// Locate the interval index `i` with `xs[i] <= x < xs[i+1]`, clamped to the
/// valid range.
fn locate(xs: &[Real], x: Real) -> usize {
    let n = xs.len();
    if x <= xs[0] {
        return 0;
    }
    if x >= xs[n - 1] {
        return n - 2;
    }
    let mut lo = 0;
    let mut hi = n - 1;
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

fn check_points(xs: &[Real], ys: &[Real], min_points: usize) -> Result<()> {
    ensure!(
        xs.len() >= min_points,
        InvalidParameter,
        "need at least {min_points} points, got {}",
        xs.len()
    );
    ensure!(
        xs.len() == ys.len(),
        InvalidParameter,
        "xs and ys must have the same length ({} vs {})",
        xs.len(),
        ys.len()
    );
    ensure!(
        xs.windows(2).all(|w| w[1] > w[0]),
        InvalidParameter,
        "abscissae must be strictly increasing"
    );
    Ok(())
}

// ── Linear ────────────────────────────────────────────────────────────────────

/// Linear interpolation between sorted abscissae.
#[derive(Debug, Clone)]
pub struct LinearInterpolation {
    xs: Vec<Real>,
    ys: Vec<Real>,
}

impl LinearInterpolation {
    /// Construct a linear interpolation from sorted `xs` and matching `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_points(xs, ys, 2)?;
        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
        })
    }
}

impl Interpolation1D for LinearInterpolation {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        *self.xs.last().unwrap()
    }

    fn value(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = self.xs[i + 1] - self.xs[i];
        self.ys[i] + (x - self.xs[i]) * (self.ys[i + 1] - self.ys[i]) / dx
    }
}

// ── Natural cubic spline ──────────────────────────────────────────────────────

/// Natural cubic spline: C² interpolation with vanishing second derivative at
/// both ends.
///
/// The second derivatives at the knots are obtained from the standard
/// tridiagonal system for non-uniform spacing, solved once at construction.
#[derive(Debug, Clone)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    /// Second derivatives at the knots.
    d2: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Construct a natural cubic spline from sorted `xs` and matching `ys`.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        check_points(xs, ys, 3)?;
        let n = xs.len();

        // Thomas solve of the interior system; natural ends d2[0]=d2[n-1]=0.
        let mut diag = vec![0.0; n];
        let mut rhs = vec![0.0; n];
        for i in 1..n - 1 {
            let hm = xs[i] - xs[i - 1];
            let hp = xs[i + 1] - xs[i];
            diag[i] = 2.0 * (hm + hp);
            rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / hp - (ys[i] - ys[i - 1]) / hm);
        }
        let mut c_prime = vec![0.0; n];
        let mut d_prime = vec![0.0; n];
        for i in 1..n - 1 {
            let hm = xs[i] - xs[i - 1];
            let hp = xs[i + 1] - xs[i];
            let denom = diag[i] - hm * c_prime[i - 1];
            c_prime[i] = hp / denom;
            d_prime[i] = (rhs[i] - hm * d_prime[i - 1]) / denom;
        }
        let mut d2 = vec![0.0; n];
        for i in (1..n - 1).rev() {
            d2[i] = d_prime[i] - c_prime[i] * d2[i + 1];
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            d2,
        })
    }

    fn segment(&self, x: Real) -> (usize, Real, Real, Real) {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (i, h, a, b)
    }

    /// First derivative of the spline at `x`.
    pub fn derivative(&self, x: Real) -> Real {
        let (i, h, a, b) = self.segment(x);
        (self.ys[i + 1] - self.ys[i]) / h
            - (3.0 * a * a - 1.0) / 6.0 * h * self.d2[i]
            + (3.0 * b * b - 1.0) / 6.0 * h * self.d2[i + 1]
    }

    /// Second derivative of the spline at `x`.
    pub fn second_derivative(&self, x: Real) -> Real {
        let (i, _, a, b) = self.segment(x);
        a * self.d2[i] + b * self.d2[i + 1]
    }
}

impl Interpolation1D for CubicNaturalSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        *self.xs.last().unwrap()
    }

    fn value(&self, x: Real) -> Real {
        let (i, h, a, b) = self.segment(x);
        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.d2[i] + (b * b * b - b) * self.d2[i + 1]) * h * h / 6.0
    }
}
