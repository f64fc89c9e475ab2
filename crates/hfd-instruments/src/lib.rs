//! # hfd-instruments
//!
//! Contract descriptions consumed by the pricing engines: payoffs, exercise
//! styles, barrier and dividend features, and the `PricingEngine` interface.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Exercise styles.
pub mod exercise;

/// Pricing results and the engine interface.
pub mod instrument;

/// Vanilla and barrier option argument bundles.
pub mod option;

/// Payoff types.
pub mod payoff;

pub use exercise::{Exercise, ExerciseType};
pub use instrument::{PricingEngine, PricingResults};
pub use option::{
    BarrierOptionArguments, BarrierType, DividendSchedule, VanillaOptionArguments,
};
pub use payoff::{CashOrNothingPayoff, OptionType, Payoff, PlainVanillaPayoff, StrikedPayoff};
