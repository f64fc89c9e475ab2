//! The Heston stochastic-volatility process.
//!
//! ```text
//! dS = (r - q) S dt + √v S dW₁
//! dv = κ(θ - v) dt + σ √v dW₂,   d⟨W₁, W₂⟩ = ρ dt
//! ```
//!
//! An immutable, validated parameter holder; the finite-difference operators
//! and the analytic oracle read the model exclusively through it.

use hfd_core::{ensure, errors::Result, Real};
use hfd_termstructures::YieldTermStructure;
use std::sync::Arc;

/// Heston process parameters together with the risk-free and dividend
/// yield curves.
#[derive(Debug, Clone)]
pub struct HestonProcess {
    risk_free_rate: Arc<dyn YieldTermStructure>,
    dividend_yield: Arc<dyn YieldTermStructure>,
    s0: Real,
    v0: Real,
    kappa: Real,
    theta: Real,
    sigma: Real,
    rho: Real,
}

impl HestonProcess {
    /// Create a validated Heston process.
    ///
    /// # Errors
    /// Fails with `InvalidParameter` for non-positive spot, `κ ≤ 0`,
    /// `θ ≤ 0`, negative `σ` or `v₀`, or `ρ` outside `[-1, 1]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        risk_free_rate: Arc<dyn YieldTermStructure>,
        dividend_yield: Arc<dyn YieldTermStructure>,
        s0: Real,
        v0: Real,
        kappa: Real,
        theta: Real,
        sigma: Real,
        rho: Real,
    ) -> Result<Self> {
        ensure!(s0 > 0.0, InvalidParameter, "spot must be positive, got {s0}");
        ensure!(v0 >= 0.0, InvalidParameter, "v0 must be non-negative, got {v0}");
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
            sigma >= 0.0,
            InvalidParameter,
            "vol-of-vol must be non-negative, got {sigma}"
        );
        ensure!(
            (-1.0..=1.0).contains(&rho),
            InvalidParameter,
            "correlation must be in [-1, 1], got {rho}"
        );
        Ok(Self {
            risk_free_rate,
            dividend_yield,
            s0,
            v0,
            kappa,
            theta,
            sigma,
            rho,
        })
    }

    /// Initial asset price.
    pub fn s0(&self) -> Real {
        self.s0
    }

    /// Initial variance.
    pub fn v0(&self) -> Real {
        self.v0
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

    /// Correlation ρ between asset and variance shocks.
    pub fn rho(&self) -> Real {
        self.rho
    }

    /// The risk-free yield curve.
    pub fn risk_free_rate(&self) -> &Arc<dyn YieldTermStructure> {
        &self.risk_free_rate
    }

    /// The dividend yield curve.
    pub fn dividend_yield(&self) -> &Arc<dyn YieldTermStructure> {
        &self.dividend_yield
    }

    /// The Feller ratio `2κθ / σ²`; the origin is unattainable for the
    /// variance process when it is at least 1.
    pub fn feller_ratio(&self) -> Real {
        2.0 * self.kappa * self.theta / (self.sigma * self.sigma)
    }
}
