//! Relative Strength Index (RSI).
//!
//! Close-to-close deltas with the first delta taken as 0. Gains and loss
//! magnitudes are averaged with a simple rolling mean over `period`.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period - 1.
//! Edge cases: avg_loss == 0 with gains → 100 (saturation);
//! no movement at all → 50; avg_gain == 0 → 0.

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::sma::sma_of_series;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut gains = vec![f64::NAN; n];
        let mut losses = vec![f64::NAN; n];

        for i in 0..n {
            let delta = if i == 0 {
                if bars[0].close.is_nan() {
                    f64::NAN
                } else {
                    0.0
                }
            } else {
                bars[i].close - bars[i - 1].close
            };
            if delta.is_nan() {
                continue;
            }
            gains[i] = delta.max(0.0);
            losses[i] = (-delta).max(0.0);
        }

        let avg_gain = sma_of_series(&gains, self.period);
        let avg_loss = sma_of_series(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| {
                if g.is_nan() || l.is_nan() {
                    f64::NAN
                } else {
                    compute_rsi(g, l)
                }
            })
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0 // no movement
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains_saturates() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::new(3).compute(&bars);
        for v in &result[2..] {
            assert_approx(*v, 100.0, 1e-12);
        }
    }

    #[test]
    fn rsi_no_movement_is_neutral() {
        let bars = make_bars(&[100.0; 6]);
        let result = Rsi::new(3).compute(&bars);
        for v in &result[2..] {
            assert_approx(*v, 50.0, 1e-12);
        }
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-12);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Deltas: 0, +0.34, -0.25, -0.48, +0.72
        // Window ending at 3: gains 0.34, losses 0.73 → RSI = 100 - 100/(1 + 0.34/0.73)
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert!(!result[2].is_nan());
        let expected = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected, 1e-9);
    }

    #[test]
    fn rsi_first_delta_counts_as_zero() {
        // Window ending at 1 covers deltas [0, +2]: avg_gain = 1, avg_loss = 0.
        let bars = make_bars(&[10.0, 12.0]);
        let result = Rsi::new(2).compute(&bars);
        assert!(result[0].is_nan());
        assert_approx(result[1], 100.0, 1e-12);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&bars);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_nan_propagation() {
        let mut bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0, 106.0]);
        bars[2].close = f64::NAN;
        let result = Rsi::new(3).compute(&bars);
        // Deltas 2 and 3 are NaN, so windows ending at 2..=5 are NaN.
        assert!(result[2..=5].iter().all(|v| v.is_nan()));
        assert_approx(result[6], 100.0, 1e-12);
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::new(14).lookback(), 13);
    }
}
