//! The noncentral chi-square distribution.
//!
//! Density and distribution function are evaluated as Poisson-weighted
//! mixtures of central chi-square terms, summed outward from the Poisson
//! mode so that large noncentrality parameters (short-horizon square-root
//! process transitions) do not underflow.  The quantile inverts the CDF with
//! Brent's method.

use hfd_core::{ensure, errors::Result, Real};
use statrs::function::gamma::{gamma_lr, ln_gamma};

use super::normal::normal_cdf_inverse;
use crate::solvers1d::brent;

const LN_2: Real = std::f64::consts::LN_2;
const TERM_EPS: Real = 1e-16;
const MAX_TERMS: i64 = 100_000;

fn ln_chi_square_pdf(x: Real, k: Real) -> Real {
    let half_k = 0.5 * k;
    (half_k - 1.0) * x.ln() - 0.5 * x - half_k * LN_2 - ln_gamma(half_k)
}

/// Sum `g(j) * w_j` over the Poisson weights `w_j = e^{-λ/2} (λ/2)^j / j!`,
/// expanding outward from the mode `j₀ = ⌊λ/2⌋`.
fn poisson_mixture<G>(half_lambda: Real, g: G) -> Real
where
    G: Fn(i64, Real) -> Real,
{
    let mode = half_lambda.floor() as i64;
    let lw_mode = -half_lambda + mode as Real * half_lambda.ln() - ln_gamma(mode as Real + 1.0);

    let mut sum = 0.0;

    // Upward from the mode; terms may still grow past the Poisson mode when
    // the kernel peaks at a larger order, so only stop once they decay.
    let mut lw = lw_mode;
    let mut prev = Real::MAX;
    let mut j = mode;
    loop {
        let term = g(j, lw);
        sum += term;
        if (j > mode && term == 0.0)
            || (term <= prev && term < sum.abs() * TERM_EPS)
            || j > mode + MAX_TERMS
        {
            break;
        }
        prev = term;
        j += 1;
        lw += half_lambda.ln() - (j as Real).ln();
    }

    // Downward from the mode.
    lw = lw_mode;
    prev = Real::MAX;
    j = mode;
    while j > 0 {
        lw += (j as Real).ln() - half_lambda.ln();
        j -= 1;
        let term = g(j, lw);
        sum += term;
        if term == 0.0 || (term <= prev && term < sum.abs() * TERM_EPS) {
            break;
        }
        prev = term;
    }

    sum
}

/// Density of the noncentral chi-square distribution with `df` degrees of
/// freedom and noncentrality `ncp`, at `x`.
pub fn non_central_chi_square_pdf(df: Real, ncp: Real, x: Real) -> Real {
    if x <= 0.0 {
        return 0.0;
    }
    let half = 0.5 * ncp;
    if half < 1e-12 {
        return ln_chi_square_pdf(x, df).exp();
    }
    poisson_mixture(half, |j, lw| {
        (lw + ln_chi_square_pdf(x, df + 2.0 * j as Real)).exp()
    })
}

/// Distribution function of the noncentral chi-square distribution.
pub fn non_central_chi_square_cdf(df: Real, ncp: Real, x: Real) -> Real {
    if x <= 0.0 {
        return 0.0;
    }
    let half = 0.5 * ncp;
    if half < 1e-12 {
        return gamma_lr(0.5 * df, 0.5 * x);
    }
    poisson_mixture(half, |j, lw| {
        lw.exp() * gamma_lr(0.5 * df + j as Real, 0.5 * x)
    })
    .min(1.0)
}

/// Sankaran's power-normal approximation, used where the exact Poisson
/// mixture would need tens of thousands of terms. Relative error is below
/// 1e-4 at the switch-over size.
fn sankaran_quantile(df: Real, ncp: Real, p: Real) -> Real {
    let s = df + ncp;
    let s2 = df + 2.0 * ncp;
    let h = 1.0 - 2.0 / 3.0 * s * (df + 3.0 * ncp) / (s2 * s2);
    let pp = s2 / (s * s);
    let m = (h - 1.0) * (1.0 - 3.0 * h);
    let mean = 1.0 + h * pp * (h - 1.0 - 0.5 * (2.0 - h) * m * pp);
    let sd = h * (2.0 * pp).sqrt() * (1.0 + 0.5 * m * pp);
    let z = normal_cdf_inverse(p);
    s * (mean + z * sd).max(Real::MIN_POSITIVE).powf(1.0 / h)
}

const SANKARAN_THRESHOLD: Real = 1e5;

/// Quantile (inverse CDF) of the noncentral chi-square distribution, for
/// `p` in `(0, 1)`.
pub fn non_central_chi_square_quantile(df: Real, ncp: Real, p: Real) -> Result<Real> {
    ensure!(
        p > 0.0 && p < 1.0,
        InvalidParameter,
        "quantile probability must be in (0, 1), got {p}"
    );
    if df + ncp > SANKARAN_THRESHOLD {
        return Ok(sankaran_quantile(df, ncp, p));
    }

    let mean = df + ncp;
    let std_dev = (2.0 * (df + 2.0 * ncp)).sqrt();
    let mut hi = mean + 10.0 * std_dev + 10.0;
    while non_central_chi_square_cdf(df, ncp, hi) < p {
        hi *= 2.0;
        ensure!(
            hi < 1e12,
            Convergence,
            "failed to bracket noncentral chi-square quantile for p = {p}"
        );
    }

    brent(
        |x| non_central_chi_square_cdf(df, ncp, x) - p,
        0.0,
        hi,
        1e-10,
    )
}
