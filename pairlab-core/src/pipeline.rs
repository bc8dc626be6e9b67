//! End-to-end pairs pipeline.
//!
//! Cointegration gate, hedge ratio, spread signal, indicators on leg A,
//! RSI/ADX blend, regime detection, routing. The result is an annotated
//! per-bar frame that `simulate` backtests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::rule::RuleInput;
use crate::config::{ConfigError, PipelineConfig};
use crate::domain::{PairSeries, Signal};
use crate::engine::{PortfolioSimulator, SignalSource, SimBar, SimulationConfig, SimulationResult};
use crate::indicators::IndicatorBank;
use crate::pairs::{
    compute_spread, CointegrationGate, CointegrationResult, HedgeRatio, HedgeRatioEstimator,
    SpreadBand, SpreadSignalGenerator,
};
use crate::regime::{FeatureInputs, RegimeAssignment, RegimeDetector, RegimeError};
use crate::stats::StatsError;
use crate::strategy::{combined_signals, StrategyRouter};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("'{symbol_a}' and '{symbol_b}' are not cointegrated (p = {p_value:.4})")]
    NotCointegrated {
        symbol_a: String,
        symbol_b: String,
        p_value: f64,
    },

    #[error(transparent)]
    Stats(#[from] StatsError),

    #[error("regime detection failed: {0}")]
    Regime(#[from] RegimeError),
}

/// Everything the pipeline knows about one bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRow {
    pub index: usize,
    pub date: NaiveDate,
    pub close_a: f64,
    pub close_b: f64,
    pub spread: f64,
    pub spread_z: f64,
    pub spread_signal: Signal,
    pub atr: f64,
    pub rsi: f64,
    pub adx: f64,
    pub macd: f64,
    pub bollinger_lower: f64,
    pub bollinger_upper: f64,
    pub ema_trend: f64,
    /// Reference stop level at this bar's close.
    pub stop_loss: f64,
    /// Reference take-profit level at this bar's close.
    pub take_profit: f64,
    pub rsi_signal: i8,
    pub adx_signal: i8,
    pub combined: Signal,
    pub regime: Option<usize>,
    /// None when the bar's regime has no rule.
    pub routed: Option<Signal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedFrame {
    pub symbol_a: String,
    pub symbol_b: String,
    pub rows: Vec<FrameRow>,
}

impl AnnotatedFrame {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn signal_at(&self, index: usize, source: SignalSource) -> Signal {
        let row = &self.rows[index];
        match source {
            SignalSource::Routed => row.routed.unwrap_or(Signal::Flat),
            SignalSource::Combined => row.combined,
            SignalSource::Spread => row.spread_signal,
        }
    }

    /// Simulator input for leg A driven by `source`.
    pub fn sim_bars(&self, source: SignalSource) -> Vec<SimBar> {
        (0..self.rows.len())
            .map(|i| {
                let row = &self.rows[i];
                SimBar {
                    date: row.date,
                    close: row.close_a,
                    atr: row.atr,
                    signal: self.signal_at(i, source),
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub frame: AnnotatedFrame,
    pub final_spread: f64,
    pub spread_band: SpreadBand,
    pub cointegration: CointegrationResult,
    pub hedge_ratio: HedgeRatio,
    pub regimes: RegimeAssignment,
}

/// Run every analysis stage on `pair`.
///
/// Fails fast with `NotCointegrated` when the gate rejects the pair; nothing
/// downstream runs in that case.
pub fn run_pairs_pipeline(
    pair: &PairSeries,
    config: &PipelineConfig,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;

    let cointegration = CointegrationGate::new(config.significance).test(pair)?;
    if !cointegration.is_cointegrated {
        return Err(PipelineError::NotCointegrated {
            symbol_a: pair.symbol_a().to_string(),
            symbol_b: pair.symbol_b().to_string(),
            p_value: cointegration.p_value,
        });
    }

    let hedge_ratio = HedgeRatioEstimator.estimate(pair)?;
    let closes_a = pair.closes_a();
    let closes_b = pair.closes_b();
    let spread = compute_spread(&closes_a, &closes_b, &hedge_ratio);
    let spread_signals = SpreadSignalGenerator::new(config.signal.spread_band_k).generate(&spread);

    let indicators = IndicatorBank::new(config.indicators.clone()).compute(pair.a());
    let blend = combined_signals(&config.signal, &indicators.rsi, &indicators.adx);

    let regimes = RegimeDetector::new(config.regime.clone()).detect(&FeatureInputs {
        frame: &indicators,
        spread: &spread,
        closes: &closes_a,
    })?;

    let rule_inputs: Vec<RuleInput> = (0..pair.len())
        .map(|i| RuleInput {
            close: closes_a[i],
            combined: blend.combined[i],
            lower_band: indicators.bollinger_lower[i],
            upper_band: indicators.bollinger_upper[i],
            trend_ema: indicators.ema_trend[i],
        })
        .collect();
    let routed = StrategyRouter::new(config.routing).route(
        &rule_inputs,
        &regimes.labels,
        &spread_signals.signals,
    );

    let sim = &config.simulation;
    let rows: Vec<FrameRow> = pair
        .dates()
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let atr = indicators.atr[i];
            FrameRow {
                index: i,
                date,
                close_a: closes_a[i],
                close_b: closes_b[i],
                spread: spread[i],
                spread_z: spread_signals.z_scores[i],
                spread_signal: spread_signals.signals[i],
                atr,
                rsi: indicators.rsi[i],
                adx: indicators.adx[i],
                macd: indicators.macd[i],
                bollinger_lower: indicators.bollinger_lower[i],
                bollinger_upper: indicators.bollinger_upper[i],
                ema_trend: indicators.ema_trend[i],
                stop_loss: closes_a[i] - sim.stop_loss_atr * atr,
                take_profit: closes_a[i] + sim.take_profit_atr * atr,
                rsi_signal: blend.rsi[i],
                adx_signal: blend.adx[i],
                combined: blend.combined[i],
                regime: regimes.labels[i],
                routed: routed[i],
            }
        })
        .collect();

    let final_spread = spread.last().copied().unwrap_or(f64::NAN);
    tracing::info!(
        symbol_a = pair.symbol_a(),
        symbol_b = pair.symbol_b(),
        hedge_ratio = hedge_ratio.slope,
        final_spread,
        bars = rows.len(),
        "pipeline complete"
    );

    Ok(PipelineOutput {
        frame: AnnotatedFrame {
            symbol_a: pair.symbol_a().to_string(),
            symbol_b: pair.symbol_b().to_string(),
            rows,
        },
        final_spread,
        spread_band: spread_signals.band,
        cointegration,
        hedge_ratio,
        regimes,
    })
}

/// Backtest the annotated frame.
pub fn simulate(frame: &AnnotatedFrame, config: &SimulationConfig) -> SimulationResult {
    PortfolioSimulator::new(config.clone()).run(&frame.sim_bars(config.signal_source))
}
