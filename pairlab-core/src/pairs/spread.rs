//! Spread construction and the whole-window band signal.
//!
//! The band statistics are fitted over the full sample, so the signal at bar t
//! depends on later bars. This is an offline research signal.

use serde::{Deserialize, Serialize};

use super::hedge::HedgeRatio;
use crate::domain::Signal;

/// `a - slope * b` per bar. NaN in either leg gives NaN.
pub fn compute_spread(a: &[f64], b: &[f64], hedge: &HedgeRatio) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - hedge.slope * y).collect()
}

/// Mean and sample standard deviation of the finite spread values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadBand {
    pub mean: f64,
    pub std: f64,
    pub k: f64,
}

impl SpreadBand {
    pub fn fit(spread: &[f64], k: f64) -> Self {
        let finite: Vec<f64> = spread.iter().copied().filter(|v| v.is_finite()).collect();
        let mean = if finite.is_empty() {
            f64::NAN
        } else {
            finite.iter().sum::<f64>() / finite.len() as f64
        };
        let std = if finite.len() < 2 {
            0.0
        } else {
            let ss: f64 = finite.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (finite.len() - 1) as f64).sqrt()
        };
        Self { mean, std, k }
    }

    pub fn upper(&self) -> f64 {
        self.mean + self.k * self.std
    }

    pub fn lower(&self) -> f64 {
        self.mean - self.k * self.std
    }

    pub fn classify(&self, value: f64) -> Signal {
        if !(self.std > 0.0) || !value.is_finite() {
            return Signal::Flat;
        }
        if value > self.upper() {
            Signal::Short
        } else if value < self.lower() {
            Signal::Long
        } else {
            Signal::Flat
        }
    }

    /// Distance from the mean in standard deviations; NaN when undefined.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std > 0.0 {
            (value - self.mean) / self.std
        } else {
            f64::NAN
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadSignals {
    pub band: SpreadBand,
    pub signals: Vec<Signal>,
    pub z_scores: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpreadSignalGenerator {
    k: f64,
}

impl Default for SpreadSignalGenerator {
    fn default() -> Self {
        Self { k: 2.0 }
    }
}

impl SpreadSignalGenerator {
    pub fn new(k: f64) -> Self {
        Self { k }
    }

    pub fn generate(&self, spread: &[f64]) -> SpreadSignals {
        let band = SpreadBand::fit(spread, self.k);
        SpreadSignals {
            band,
            signals: spread.iter().map(|&v| band.classify(v)).collect(),
            z_scores: spread.iter().map(|&v| band.z_score(v)).collect(),
        }
    }
}
