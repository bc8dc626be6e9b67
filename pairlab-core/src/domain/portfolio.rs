//! Position and per-bar portfolio snapshots.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::signal::Signal;

/// Mutable simulation state owned by the simulator.
///
/// Shares are an unsigned count, so a negative position is unrepresentable.
/// Stop and take-profit levels exist only while a position is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub shares: u64,
    pub cash: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl Position {
    pub fn new(initial_cash: f64) -> Self {
        Self {
            shares: 0,
            cash: initial_cash,
            stop_loss: None,
            take_profit: None,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.shares == 0
    }

    /// Portfolio value at the given mark price.
    pub fn value(&self, mark: f64) -> f64 {
        self.cash + self.shares as f64 * mark
    }

    /// True when an open position has breached either protective level.
    ///
    /// Missing or NaN levels never trigger.
    pub fn level_breached(&self, close: f64) -> bool {
        if self.shares == 0 {
            return false;
        }
        let stop_hit = self.stop_loss.is_some_and(|s| close <= s);
        let take_hit = self.take_profit.is_some_and(|t| close >= t);
        stop_hit || take_hit
    }
}

/// Snapshot recorded after the bar's actions have been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub index: usize,
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Signal,
    pub shares: u64,
    pub cash: f64,
    pub value: f64,
    /// Fractional change of `value` versus the previous bar; None on the first bar.
    pub trade_return: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_marks_shares_at_close() {
        let mut pos = Position::new(900.0);
        pos.shares = 2;
        assert_eq!(pos.value(110.0), 1120.0);
    }

    #[test]
    fn flat_position_never_breaches() {
        let mut pos = Position::new(1000.0);
        pos.stop_loss = Some(200.0);
        assert!(!pos.level_breached(100.0));
    }

    #[test]
    fn nan_levels_never_breach() {
        let mut pos = Position::new(1000.0);
        pos.shares = 1;
        pos.stop_loss = Some(f64::NAN);
        pos.take_profit = Some(f64::NAN);
        assert!(!pos.level_breached(100.0));
    }

    #[test]
    fn breach_is_inclusive() {
        let mut pos = Position::new(0.0);
        pos.shares = 1;
        pos.stop_loss = Some(95.0);
        pos.take_profit = Some(105.0);
        assert!(pos.level_breached(95.0));
        assert!(pos.level_breached(105.0));
        assert!(!pos.level_breached(100.0));
    }
}
