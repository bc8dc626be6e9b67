//! Bar: the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLC bar for one leg of a pair.
///
/// Open and volume are optional: every computation in the pipeline needs only
/// high, low and close. Position in the owning `Vec` is the bar's ordinal index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    #[serde(default)]
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<u64>,
}

impl Bar {
    pub fn new(date: NaiveDate, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open: None,
            high,
            low,
            close,
            volume: None,
        }
    }

    /// Returns true if any required field (high, low, close) is not finite.
    pub fn is_void(&self) -> bool {
        !self.high.is_finite() || !self.low.is_finite() || !self.close.is_finite()
    }

    /// Basic sanity check: high >= low and close inside the range.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        let open_ok = self
            .open
            .map_or(true, |o| o.is_finite() && o <= self.high && o >= self.low);
        self.high >= self.low
            && self.close <= self.high
            && self.close >= self.low
            && self.close > 0.0
            && open_ok
    }
}

/// Extract the close series from a bar slice.
pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
