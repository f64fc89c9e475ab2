//! # hfd-processes
//!
//! Stochastic-process descriptions consumed by the finite-difference engine:
//! the Heston model parameters with their yield curves, and the closed-form
//! densities of the square-root (CIR) variance process.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The Heston process parameter holder.
pub mod heston_process;

/// Closed-form densities of the square-root process.
pub mod square_root_process;

pub use heston_process::HestonProcess;
pub use square_root_process::SquareRootProcess;
