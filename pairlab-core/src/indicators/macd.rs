//! MACD: Moving Average Convergence/Divergence.
//!
//! MACD = EMA(close, fast) - EMA(close, slow)
//! Signal line = EMA(MACD, signal)
//! Histogram = MACD - signal line
//!
//! All EMAs are first-value seeded, so every line is defined from bar 0.

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::ema::ema_of_series;

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

/// The five MACD series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdLines {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(
            fast >= 1 && slow >= 1 && signal >= 1,
            "MACD spans must be >= 1"
        );
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }

    pub fn lines(&self, bars: &[Bar]) -> MacdLines {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let ema_fast = ema_of_series(&closes, self.fast);
        let ema_slow = ema_of_series(&closes, self.slow);
        let macd: Vec<f64> = ema_fast
            .iter()
            .zip(&ema_slow)
            .map(|(f, s)| f - s)
            .collect();
        let signal = ema_of_series(&macd, self.signal);
        let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

        MacdLines {
            ema_fast,
            ema_slow,
            macd,
            signal,
            histogram,
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.lines(bars).macd
    }
}
