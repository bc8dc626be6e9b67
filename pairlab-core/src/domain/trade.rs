//! Trade: one entry in the simulator's append-only trade log.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What caused the position change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeKind {
    /// Signal-driven purchase of one unit.
    Buy,
    /// Signal-driven liquidation of the whole position.
    Sell,
    /// Stop-loss or take-profit liquidation.
    Exit,
}

impl TradeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeKind::Buy => "buy",
            TradeKind::Sell => "sell",
            TradeKind::Exit => "exit",
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable trade record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub kind: TradeKind,
    pub price: f64,
    pub index: usize,
    pub date: NaiveDate,
    /// Units moved: 1 for a buy, the full position for sell/exit.
    pub shares: u64,
}

impl Trade {
    /// Cash effect of the trade: negative for buys, positive for liquidations.
    pub fn cash_flow(&self) -> f64 {
        let notional = self.price * self.shares as f64;
        match self.kind {
            TradeKind::Buy => -notional,
            TradeKind::Sell | TradeKind::Exit => notional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(kind: TradeKind, shares: u64) -> Trade {
        Trade {
            kind,
            price: 50.0,
            index: 3,
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            shares,
        }
    }

    #[test]
    fn cash_flow_sign_follows_kind() {
        assert_eq!(trade(TradeKind::Buy, 1).cash_flow(), -50.0);
        assert_eq!(trade(TradeKind::Sell, 3).cash_flow(), 150.0);
        assert_eq!(trade(TradeKind::Exit, 2).cash_flow(), 100.0);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&trade(TradeKind::Exit, 1)).unwrap();
        assert!(json.contains(r#""kind":"exit""#));
    }
}
