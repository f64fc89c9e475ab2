//! # hfd-pricingengines
//!
//! Backward and forward finite-difference Heston engines, plus the analytic
//! oracles (Black-Scholes-Merton, Reiner-Rubinstein barriers and the
//! semi-analytic Heston characteristic-function price) used to validate
//! them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Reiner-Rubinstein knock-out barrier prices.
pub mod analytic_barrier_engine;

/// Black-Scholes-Merton closed form with Greeks.
pub mod analytic_european_engine;

/// Semi-analytic Heston price via characteristic-function integration.
pub mod analytic_heston_engine;

/// Backward FD engine for knock-out barrier options.
pub mod fd_heston_barrier_engine;

/// Forward (Fokker-Planck) density engine for European options.
pub mod fd_heston_forward_engine;

/// Backward FD engine for European and American vanillas.
pub mod fd_heston_vanilla_engine;

pub use analytic_barrier_engine::analytic_barrier_price;
pub use analytic_european_engine::black_scholes_merton;
pub use analytic_heston_engine::heston_price;
pub use fd_heston_barrier_engine::FdHestonBarrierEngine;
pub use fd_heston_forward_engine::FdHestonForwardEngine;
pub use fd_heston_vanilla_engine::FdHestonVanillaEngine;
