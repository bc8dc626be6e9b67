//! Indicator bank: computes every indicator the pipeline needs in one pass.
//!
//! The frame is columnar: each field is a `Vec<f64>` aligned to the input bars.
//! Warm-up values are NaN and flow through downstream stages unchanged.

use serde::{Deserialize, Serialize};

use crate::domain::Bar;
use crate::indicators::{
    adx::Adx, atr::true_range, bollinger::bollinger_lines, ema::ema_of_series, macd::Macd,
    sma::sma_of_series, Rsi,
};
use crate::components::indicator::Indicator;

/// Lookback settings for the indicator bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub atr_period: usize,
    pub adx_period: usize,
    pub rsi_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bollinger_period: usize,
    pub bollinger_multiplier: f64,
    pub trend_ema_span: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            adx_period: 14,
            rsi_period: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            trend_ema_span: 200,
        }
    }
}

impl IndicatorConfig {
    /// Names and values of every period field, for validation messages.
    pub fn periods(&self) -> [(&'static str, usize); 8] {
        [
            ("atr_period", self.atr_period),
            ("adx_period", self.adx_period),
            ("rsi_period", self.rsi_period),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("bollinger_period", self.bollinger_period),
            ("trend_ema_span", self.trend_ema_span),
        ]
    }
}

/// Per-bar indicator values for the traded leg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub true_range: Vec<f64>,
    pub atr: Vec<f64>,
    pub plus_dm: Vec<f64>,
    pub minus_dm: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub rsi: Vec<f64>,
    pub bollinger_upper: Vec<f64>,
    pub bollinger_middle: Vec<f64>,
    pub bollinger_lower: Vec<f64>,
    pub ema_trend: Vec<f64>,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.true_range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.true_range.is_empty()
    }
}

/// Stateless bank of indicator transforms.
#[derive(Debug, Clone, Default)]
pub struct IndicatorBank {
    config: IndicatorConfig,
}

impl IndicatorBank {
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Largest warm-up of any indicator in the bank (ignoring the trend EMA,
    /// which is defined from the first bar).
    pub fn warmup_bars(&self) -> usize {
        let c = &self.config;
        c.atr_period
            .saturating_sub(1)
            .max((2 * c.adx_period).saturating_sub(1))
            .max(c.rsi_period.saturating_sub(1))
            .max(c.bollinger_period.saturating_sub(1))
    }

    pub fn compute(&self, bars: &[Bar]) -> IndicatorFrame {
        let c = &self.config;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        let tr = true_range(bars);
        let atr = sma_of_series(&tr, c.atr_period);
        let adx = Adx::new(c.adx_period).lines(bars);
        let macd = Macd::new(c.macd_fast, c.macd_slow, c.macd_signal).lines(bars);
        let rsi = Rsi::new(c.rsi_period).compute(bars);
        let bands = bollinger_lines(&closes, c.bollinger_period, c.bollinger_multiplier);
        let ema_trend = ema_of_series(&closes, c.trend_ema_span);

        IndicatorFrame {
            true_range: tr,
            atr,
            plus_dm: adx.plus_dm,
            minus_dm: adx.minus_dm,
            plus_di: adx.plus_di,
            minus_di: adx.minus_di,
            dx: adx.dx,
            adx: adx.adx,
            ema_fast: macd.ema_fast,
            ema_slow: macd.ema_slow,
            macd: macd.macd,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            rsi,
            bollinger_upper: bands.upper,
            bollinger_middle: bands.middle,
            bollinger_lower: bands.lower,
            ema_trend,
        }
    }
}
