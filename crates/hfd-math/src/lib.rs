//! # hfd-math
//!
//! Mathematical utilities shared by the finite-difference engine: the
//! [`Array`] grid-function container, 1-D and 2-D spline interpolation,
//! adaptive and discrete quadrature, the normal and noncentral chi-square
//! distributions, and a Brent root finder.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// One-dimensional vector of reals used as the grid-function container.
pub mod array;

/// Probability distributions: normal, gamma, noncentral chi-square.
pub mod distributions;

/// Numerical quadrature: adaptive Simpson and discrete rules.
pub mod integrals;

/// 1-D and 2-D interpolation: linear, natural cubic, bicubic splines.
pub mod interpolations;

/// 1-D root finding.
pub mod solvers1d;

pub use array::Array;
