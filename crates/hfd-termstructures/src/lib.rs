//! # hfd-termstructures
//!
//! Yield term structures expressed in year-fraction time.  The pricing
//! engines consume rates exclusively through discount factors and the forward
//! rates derived from them.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// The `YieldTermStructure` trait.
pub mod yield_term_structure;

/// Constant-forward-rate curve.
pub mod flat_forward;

pub use flat_forward::FlatForward;
pub use yield_term_structure::YieldTermStructure;
