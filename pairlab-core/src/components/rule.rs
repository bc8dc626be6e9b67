//! Regime rule trait.
//!
//! A rule turns one bar's precomputed values into a trade direction. Rules see
//! only market data for that bar, never portfolio state.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;

/// Everything a rule may look at for a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleInput {
    pub close: f64,
    pub combined: Signal,
    pub lower_band: f64,
    pub upper_band: f64,
    pub trend_ema: f64,
}

/// Trait for per-regime signal rules.
///
/// A NaN reference level makes every comparison false, so the rule falls
/// through to `Signal::Flat`.
pub trait RegimeRule: Send + Sync {
    /// Human-readable name (e.g., "mean_reversion").
    fn name(&self) -> &str;

    fn evaluate(&self, input: &RuleInput) -> Signal;
}
