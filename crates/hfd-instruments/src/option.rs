//! Vanilla and barrier option argument bundles.
//!
//! Engines receive contracts as immutable argument structs; re-pricing a
//! scenario means constructing a new bundle, never mutating shared state.

use crate::exercise::Exercise;
use crate::payoff::StrikedPayoff;
use hfd_core::{Real, Time};
use std::sync::Arc;

/// Discrete cash dividends as `(payment time, amount)` pairs, sorted by time.
pub type DividendSchedule = Vec<(Time, Real)>;

/// Arguments describing a vanilla option.
#[derive(Debug, Clone)]
pub struct VanillaOptionArguments {
    /// Terminal payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// Exercise style and maturity.
    pub exercise: Exercise,
    /// Discrete cash dividends paid before maturity (may be empty).
    pub dividends: DividendSchedule,
}

impl VanillaOptionArguments {
    /// A vanilla option with no dividends.
    pub fn new(payoff: Arc<dyn StrikedPayoff>, exercise: Exercise) -> Self {
        Self {
            payoff,
            exercise,
            dividends: Vec::new(),
        }
    }

    /// Attach a dividend schedule.
    pub fn with_dividends(mut self, dividends: DividendSchedule) -> Self {
        self.dividends = dividends;
        self
    }
}

/// Knock-out barrier styles.
///
/// Knock-in contracts are priced by callers via in/out parity against the
/// vanilla engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrierType {
    /// Knocked out when the underlying trades at or below the barrier.
    DownOut,
    /// Knocked out when the underlying trades at or above the barrier.
    UpOut,
}

/// Arguments describing a single-barrier knock-out option.
#[derive(Debug, Clone)]
pub struct BarrierOptionArguments {
    /// Terminal payoff.
    pub payoff: Arc<dyn StrikedPayoff>,
    /// Exercise style and maturity.
    pub exercise: Exercise,
    /// Barrier style.
    pub barrier_type: BarrierType,
    /// Barrier level.
    pub barrier: Real,
    /// Rebate paid when the option knocks out.
    pub rebate: Real,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payoff::{OptionType, Payoff, PlainVanillaPayoff};

    #[test]
    fn dividend_builder_preserves_payoff() {
        let args = VanillaOptionArguments::new(
            Arc::new(PlainVanillaPayoff::new(OptionType::Put, 100.0)),
            Exercise::american(1.0),
        )
        .with_dividends(vec![(0.5, 5.0)]);
        assert_eq!(args.dividends.len(), 1);
        assert_eq!(args.payoff.value(90.0), 10.0);
    }
}
