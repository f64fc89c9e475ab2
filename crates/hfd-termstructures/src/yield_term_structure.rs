//! `YieldTermStructure` — yield / interest-rate term structures.
//!
//! Implementors provide the discount factor `P(0, t)`; continuously
//! compounded zero and forward rates follow from it via the usual
//! relationships and are what the finite-difference operators consume when
//! refreshing their time-dependent coefficients.

use hfd_core::{DiscountFactor, Rate, Time};

/// Small time step used for instantaneous forward rate computations.
const DT: Time = 1.0e-4;

/// A yield (interest-rate) term structure in year-fraction time.
pub trait YieldTermStructure: std::fmt::Debug + Send + Sync {
    /// Discount factor for time `t`.
    fn discount(&self, t: Time) -> DiscountFactor;

    /// Continuously-compounded zero rate for maturity `t`.
    fn zero_rate(&self, t: Time) -> Rate {
        if t == 0.0 {
            return self.forward_rate(0.0, DT);
        }
        -self.discount(t).ln() / t
    }

    /// Continuously-compounded forward rate between `t1` and `t2`.
    ///
    /// For `t2 == t1` the instantaneous forward rate is approximated over a
    /// small interval.
    fn forward_rate(&self, t1: Time, t2: Time) -> Rate {
        let (t1, t2) = if t2 > t1 { (t1, t2) } else { (t1, t1 + DT) };
        (self.discount(t1) / self.discount(t2)).ln() / (t2 - t1)
    }
}
