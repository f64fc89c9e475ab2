//! Error types for hestonfd-rs.
//!
//! A single `thiserror`-derived enum covers the failure modes of the
//! finite-difference machinery: malformed grids, bad model parameters,
//! evaluation points outside the resolved domain, unknown coordinate
//! transformations, and convergence failures of embedded root finders and
//! quadratures.  The `ensure!` and `fail!` macros name the variant at the
//! check site.

use thiserror::Error;

/// The top-level error type used throughout hestonfd-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Malformed mesh construction (too few points, non-increasing
    /// locations, critical point outside the range).
    #[error("invalid grid: {0}")]
    InvalidGrid(String),

    /// Invalid model or contract parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// An evaluation point falls outside the resolved grid interior.
    #[error("domain insufficient: {0}")]
    DomainInsufficient(String),

    /// Unknown or unsupported coordinate transformation.
    #[error("unsupported transformation: {0}")]
    UnsupportedTransformation(String),

    /// An embedded iterative method failed to converge.
    #[error("convergence failure: {0}")]
    Convergence(String),

    /// General runtime error.
    #[error("{0}")]
    Runtime(String),
}

/// Shorthand `Result` type used throughout hestonfd-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Return early with the named error variant if `$cond` is false.
///
/// # Example
/// ```
/// use hfd_core::{ensure, errors::Error};
/// fn positive(x: f64) -> hfd_core::errors::Result<f64> {
///     ensure!(x > 0.0, InvalidParameter, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $variant:ident, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::$variant(
                format!($($msg)*)
            ));
        }
    };
}

/// Return the named error variant immediately.
///
/// # Example
/// ```
/// use hfd_core::{fail, errors::Error};
/// fn always_err() -> hfd_core::errors::Result<()> {
///     fail!(Runtime, "something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($variant:ident, $($msg:tt)*) => {
        return Err($crate::errors::Error::$variant(format!($($msg)*)))
    };
}
