//! Component traits.
//!
//! - Indicator: bar series in, numeric series out
//! - Regime rule: one bar's values in, trade direction out

pub mod indicator;
pub mod rule;

pub use indicator::Indicator;
pub use rule::{RegimeRule, RuleInput};
