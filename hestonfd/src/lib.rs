//! # hestonfd
//!
//! Finite-difference pricing engines for the Heston stochastic-volatility
//! model: non-uniform tensor-product grids, ADI operator splitting, backward
//! pricing of European, American and barrier contracts, and forward
//! Fokker-Planck evolution of the joint density.
//!
//! This crate is a **façade** that re-exports the public items of the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `hfd-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use hestonfd::instruments::{
//!     Exercise, OptionType, PlainVanillaPayoff, PricingEngine, VanillaOptionArguments,
//! };
//! use hestonfd::pricingengines::FdHestonVanillaEngine;
//! use hestonfd::processes::HestonProcess;
//! use hestonfd::termstructures::{FlatForward, YieldTermStructure};
//!
//! let rates: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.05));
//! let dividends: Arc<dyn YieldTermStructure> = Arc::new(FlatForward::new(0.0));
//! let process =
//!     HestonProcess::new(rates, dividends, 100.0, 0.04, 2.5, 0.04, 0.66, -0.8).unwrap();
//!
//! let engine = FdHestonVanillaEngine::new(process, 50, 100, 25);
//! let option = VanillaOptionArguments::new(
//!     Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
//!     Exercise::american(1.0),
//! );
//! let results = engine.calculate(&option).unwrap();
//! assert!(results.npv > 0.0);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use hfd_core as core;

/// Mathematical utilities: arrays, interpolation, quadrature, distributions.
pub use hfd_math as math;

/// Yield term structures.
pub use hfd_termstructures as termstructures;

/// Payoffs, exercise styles and the pricing-engine interface.
pub use hfd_instruments as instruments;

/// The Heston and square-root stochastic processes.
pub use hfd_processes as processes;

/// Finite-difference meshers, operators, schemes and solvers.
pub use hfd_methods as methods;

/// Backward and forward pricing engines plus the analytic oracles.
pub use hfd_pricingengines as pricingengines;
