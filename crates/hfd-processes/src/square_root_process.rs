//! Closed-form densities of the square-root (CIR) process
//! `dv = κ(θ - v) dt + σ √v dW`.
//!
//! The transition density over a horizon `t` is a scaled noncentral
//! chi-square; the stationary density is a gamma distribution.  Both feed the
//! variance meshers, the Green's-function initialiser and the forward-
//! equation validation tests.

use hfd_core::{ensure, errors::Result, Real, Time};
use hfd_math::distributions::{
    non_central_chi_square_pdf, non_central_chi_square_quantile,
};
use statrs::function::gamma::{gamma_lr, ln_gamma};

/// Square-root process parameters with closed-form marginal densities.
#[derive(Debug, Clone, Copy)]
pub struct SquareRootProcess {
    kappa: Real,
    theta: Real,
    sigma: Real,
}

impl SquareRootProcess {
    /// Create a validated square-root process.
    pub fn new(kappa: Real, theta: Real, sigma: Real) -> Result<Self> {
        ensure!(
            kappa > 0.0,
            InvalidParameter,
            "mean-reversion speed must be positive, got {kappa}"
        );
        ensure!(
            theta > 0.0,
            InvalidParameter,
            "long-run variance must be positive, got {theta}"
        );
        ensure!(
            sigma > 0.0,
            InvalidParameter,
            "vol-of-vol must be positive, got {sigma}"
        );
        Ok(Self {
            kappa,
            theta,
            sigma,
        })
    }

    /// Mean-reversion speed κ.
    pub fn kappa(&self) -> Real {
        self.kappa
    }

    /// Long-run variance θ.
    pub fn theta(&self) -> Real {
        self.theta
    }

    /// Volatility of variance σ.
    pub fn sigma(&self) -> Real {
        self.sigma
    }

    /// The Feller ratio `2κθ / σ²`.
    pub fn feller_ratio(&self) -> Real {
        2.0 * self.kappa * self.theta / (self.sigma * self.sigma)
    }

    // ── Stationary distribution: Gamma(α, rate β) ─────────────────────────

    fn stationary_shape(&self) -> Real {
        self.feller_ratio()
    }

    fn stationary_rate(&self) -> Real {
        2.0 * self.kappa / (self.sigma * self.sigma)
    }

    /// Stationary density at `v`.
    pub fn stationary_pdf(&self, v: Real) -> Real {
        if v <= 0.0 {
            return 0.0;
        }
        let alpha = self.stationary_shape();
        let beta = self.stationary_rate();
        (alpha * beta.ln() + (alpha - 1.0) * v.ln() - beta * v - ln_gamma(alpha)).exp()
    }

    /// Stationary distribution function at `v`.
    pub fn stationary_cdf(&self, v: Real) -> Real {
        if v <= 0.0 {
            return 0.0;
        }
        gamma_lr(self.stationary_shape(), self.stationary_rate() * v)
    }

    /// Quantile of the stationary distribution, for `p` in `(0, 1)`.
    pub fn stationary_quantile(&self, p: Real) -> Result<Real> {
        ensure!(
            p > 0.0 && p < 1.0,
            InvalidParameter,
            "quantile probability must be in (0, 1), got {p}"
        );
        let mean = self.theta;
        let mut hi = 10.0 * mean;
        while self.stationary_cdf(hi) < p {
            hi *= 2.0;
            ensure!(hi < 1e10, Convergence, "failed to bracket stationary quantile");
        }
        hfd_math::solvers1d::brent(|v| self.stationary_cdf(v) - p, 0.0, hi, 1e-12)
    }

    // ── Transition distribution: scaled noncentral chi-square ─────────────

    /// Degrees of freedom of the transition law, `4κθ/σ²`.
    pub fn transition_df(&self) -> Real {
        4.0 * self.kappa * self.theta / (self.sigma * self.sigma)
    }

    fn transition_scale_and_ncp(&self, v0: Real, t: Time) -> (Real, Real) {
        let decay = (-self.kappa * t).exp();
        let c = self.sigma * self.sigma * (1.0 - decay) / (4.0 * self.kappa);
        (c, v0 * decay / c)
    }

    /// Transition density of `v_t` given `v_0`, i.e. the Green's function of
    /// the process over a horizon `t`.
    pub fn transition_pdf(&self, v0: Real, t: Time, v: Real) -> Real {
        let (c, ncp) = self.transition_scale_and_ncp(v0, t);
        non_central_chi_square_pdf(self.transition_df(), ncp, v / c) / c
    }

    /// Quantile of the transition law of `v_t` given `v_0`.
    pub fn transition_quantile(&self, v0: Real, t: Time, p: Real) -> Result<Real> {
        let (c, ncp) = self.transition_scale_and_ncp(v0, t);
        Ok(c * non_central_chi_square_quantile(self.transition_df(), ncp, p)?)
    }
}
