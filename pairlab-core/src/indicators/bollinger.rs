//! Bollinger Bands: moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Uses sample stddev (divide by N-1); a one-bar window has zero width.
//! Lookback: period - 1.

use crate::components::indicator::Indicator;
use crate::domain::Bar;

/// Which band of the Bollinger Bands to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

/// All three bands at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerLines {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

impl Bollinger {
    fn with_band(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        assert!(period >= 1, "Bollinger period must be >= 1");
        let label = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period,
            multiplier,
            band,
            name: format!("bollinger_{label}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Upper)
    }

    pub fn middle(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Middle)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::with_band(period, multiplier, BollingerBand::Lower)
    }
}

/// Compute all three bands over a close series.
pub fn bollinger_lines(closes: &[f64], period: usize, multiplier: f64) -> BollingerLines {
    let n = closes.len();
    let mut lines = BollingerLines {
        upper: vec![f64::NAN; n],
        middle: vec![f64::NAN; n],
        lower: vec![f64::NAN; n],
    };

    if period == 0 || n < period {
        return lines;
    }

    for i in (period - 1)..n {
        let window = &closes[(i + 1 - period)..=i];
        if window.iter().any(|v| v.is_nan()) {
            continue;
        }

        let mean = window.iter().sum::<f64>() / period as f64;
        let stddev = if period > 1 {
            let ss: f64 = window.iter().map(|c| (c - mean).powi(2)).sum();
            (ss / (period - 1) as f64).sqrt()
        } else {
            0.0
        };

        lines.middle[i] = mean;
        lines.upper[i] = mean + multiplier * stddev;
        lines.lower[i] = mean - multiplier * stddev;
    }

    lines
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let lines = bollinger_lines(&closes, self.period, self.multiplier);
        match self.band {
            BollingerBand::Upper => lines.upper,
            BollingerBand::Middle => lines.middle,
            BollingerBand::Lower => lines.lower,
        }
    }
}
