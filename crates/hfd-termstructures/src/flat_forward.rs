//! `FlatForward` — a yield term structure with a constant forward rate.
//!
//! The simplest possible curve: one continuously-compounded rate for all
//! maturities, `P(t) = exp(-r t)`.

use crate::yield_term_structure::YieldTermStructure;
use hfd_core::{DiscountFactor, Rate, Time};

/// A flat (constant) forward-rate yield term structure.
#[derive(Debug, Clone, Copy)]
pub struct FlatForward {
    rate: Rate,
}

impl FlatForward {
    /// Create a flat curve from a continuously-compounded rate.
    pub fn new(rate: Rate) -> Self {
        Self { rate }
    }

    /// The flat rate.
    pub fn rate(&self) -> Rate {
        self.rate
    }
}

impl YieldTermStructure for FlatForward {
    fn discount(&self, t: Time) -> DiscountFactor {
        (-self.rate * t).exp()
    }
}
