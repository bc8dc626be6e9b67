//! RSI/ADX sub-signals and their weighted blend.

use serde::{Deserialize, Serialize};

use crate::domain::Signal;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub rsi_weight: f64,
    pub adx_weight: f64,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub adx_trend: f64,
    /// Band width, in standard deviations, of the spread signal.
    pub spread_band_k: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            rsi_weight: 0.5,
            adx_weight: 0.5,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            adx_trend: 25.0,
            spread_band_k: 2.0,
        }
    }
}

impl SignalConfig {
    /// 1 when oversold, -1 when overbought, else 0. NaN is 0.
    pub fn rsi_signal(&self, rsi: f64) -> i8 {
        if rsi < self.rsi_oversold {
            1
        } else if rsi > self.rsi_overbought {
            -1
        } else {
            0
        }
    }

    /// 1 when the trend is strong, else 0. NaN is 0.
    pub fn adx_signal(&self, adx: f64) -> i8 {
        if adx > self.adx_trend {
            1
        } else {
            0
        }
    }

    /// Weighted sum rounded half-to-even, then clamped to a direction.
    pub fn combine(&self, rsi_signal: i8, adx_signal: i8) -> Signal {
        let score = self.rsi_weight * f64::from(rsi_signal) + self.adx_weight * f64::from(adx_signal);
        Signal::from_score(score.round_ties_even())
    }
}

/// Per-bar sub-signals and blend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombinedSignals {
    pub rsi: Vec<i8>,
    pub adx: Vec<i8>,
    pub combined: Vec<Signal>,
}

pub fn combined_signals(config: &SignalConfig, rsi: &[f64], adx: &[f64]) -> CombinedSignals {
    let rsi_sig: Vec<i8> = rsi.iter().map(|&v| config.rsi_signal(v)).collect();
    let adx_sig: Vec<i8> = adx.iter().map(|&v| config.adx_signal(v)).collect();
    let combined = rsi_sig
        .iter()
        .zip(&adx_sig)
        .map(|(&r, &a)| config.combine(r, a))
        .collect();
    CombinedSignals {
        rsi: rsi_sig,
        adx: adx_sig,
        combined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_signal_thresholds() {
        let c = SignalConfig::default();
        assert_eq!(c.rsi_signal(25.0), 1);
        assert_eq!(c.rsi_signal(30.0), 0);
        assert_eq!(c.rsi_signal(75.0), -1);
        assert_eq!(c.rsi_signal(f64::NAN), 0);
        assert_eq!(c.adx_signal(25.0), 0);
        assert_eq!(c.adx_signal(26.0), 1);
        assert_eq!(c.adx_signal(f64::NAN), 0);
    }

    #[test]
    fn half_rounds_to_even() {
        let c = SignalConfig::default();
        // 0.5 rounds to 0, 1.0 stays 1, -0.5 rounds to -0.
        assert_eq!(c.combine(1, 0), Signal::Flat);
        assert_eq!(c.combine(1, 1), Signal::Long);
        assert_eq!(c.combine(-1, 0), Signal::Flat);
        assert_eq!(c.combine(-1, 1), Signal::Flat);
        assert_eq!(c.combine(0, 1), Signal::Flat);
    }

    #[test]
    fn heavy_weights_are_clamped() {
        let c = SignalConfig {
            rsi_weight: 3.0,
            ..SignalConfig::default()
        };
        assert_eq!(c.combine(-1, 0), Signal::Short);
        assert_eq!(c.combine(1, 1), Signal::Long);
    }

    #[test]
    fn series_align() {
        let out = combined_signals(
            &SignalConfig::default(),
            &[f64::NAN, 20.0, 80.0],
            &[f64::NAN, 30.0, 10.0],
        );
        assert_eq!(out.rsi, vec![0, 1, -1]);
        assert_eq!(out.adx, vec![0, 1, 0]);
        assert_eq!(out.combined, vec![Signal::Flat, Signal::Long, Signal::Flat]);
    }
}
