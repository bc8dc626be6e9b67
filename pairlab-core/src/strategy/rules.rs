//! Regime rules: mean reversion for calm regimes, trend following for
//! directional ones.

use crate::components::rule::{RegimeRule, RuleInput};
use crate::domain::Signal;

/// Buy a long blend below the lower band, sell a short blend above the upper band.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanReversion;

impl RegimeRule for MeanReversion {
    fn name(&self) -> &str {
        "mean_reversion"
    }

    fn evaluate(&self, input: &RuleInput) -> Signal {
        match input.combined {
            Signal::Long if input.close < input.lower_band => Signal::Long,
            Signal::Short if input.close > input.upper_band => Signal::Short,
            _ => Signal::Flat,
        }
    }
}

/// Follow a long blend above the trend EMA, a short blend below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendFollowing;

impl RegimeRule for TrendFollowing {
    fn name(&self) -> &str {
        "trend_following"
    }

    fn evaluate(&self, input: &RuleInput) -> Signal {
        match input.combined {
            Signal::Long if input.close > input.trend_ema => Signal::Long,
            Signal::Short if input.close < input.trend_ema => Signal::Short,
            _ => Signal::Flat,
        }
    }
}
