//! Bar-by-bar portfolio simulation of the traded leg.
//!
//! Per bar, in order:
//! 1. Long signal with enough cash: buy one unit, anchor stop/take-profit on this bar
//! 2. Otherwise, short signal while holding: sell everything
//! 3. Holding and a protective level is breached: exit everything (may follow 1 in the same bar)
//! 4. Record the snapshot
//!
//! Bars with a non-finite close take no action; their value is marked at the
//! last valid close.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PortfolioState, Position, Signal, Trade, TradeKind};

/// Which frame column drives the simulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSource {
    /// Regime-routed signal; untradable bars act as flat.
    #[default]
    Routed,
    /// RSI/ADX blend, ignoring regimes.
    Combined,
    /// Spread band signal.
    Spread,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub initial_cash: f64,
    /// Stop distance below the entry close, in ATRs.
    pub stop_loss_atr: f64,
    /// Take-profit distance above the entry close, in ATRs.
    pub take_profit_atr: f64,
    pub signal_source: SignalSource,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_cash: 100_000.0,
            stop_loss_atr: 1.5,
            take_profit_atr: 1.5,
            signal_source: SignalSource::default(),
        }
    }
}

/// One simulator input row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimBar {
    pub date: NaiveDate,
    pub close: f64,
    pub atr: f64,
    pub signal: Signal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSummary {
    pub initial_cash: f64,
    pub final_value: f64,
    pub trade_count: usize,
    pub total_return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub states: Vec<PortfolioState>,
    pub trades: Vec<Trade>,
    pub summary: SimulationSummary,
}

impl SimulationResult {
    pub fn values(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.value).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PortfolioSimulator {
    config: SimulationConfig,
}

impl PortfolioSimulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn liquidate(position: &mut Position, bar: &SimBar, index: usize, kind: TradeKind) -> Trade {
        let shares = position.shares;
        position.cash += shares as f64 * bar.close;
        position.shares = 0;
        position.stop_loss = None;
        position.take_profit = None;
        Trade {
            kind,
            price: bar.close,
            index,
            date: bar.date,
            shares,
        }
    }

    pub fn run(&self, bars: &[SimBar]) -> SimulationResult {
        let cfg = &self.config;
        let mut position = Position::new(cfg.initial_cash);
        let mut trades = Vec::new();
        let mut states = Vec::with_capacity(bars.len());
        let mut last_close = f64::NAN;

        for (index, bar) in bars.iter().enumerate() {
            if bar.close.is_finite() {
                last_close = bar.close;

                if bar.signal == Signal::Long && position.cash >= bar.close {
                    position.shares += 1;
                    position.cash -= bar.close;
                    position.stop_loss = Some(bar.close - cfg.stop_loss_atr * bar.atr);
                    position.take_profit = Some(bar.close + cfg.take_profit_atr * bar.atr);
                    trades.push(Trade {
                        kind: TradeKind::Buy,
                        price: bar.close,
                        index,
                        date: bar.date,
                        shares: 1,
                    });
                    tracing::debug!(index, price = bar.close, shares = position.shares, "buy");
                } else if bar.signal == Signal::Short && position.shares > 0 {
                    let trade = Self::liquidate(&mut position, bar, index, TradeKind::Sell);
                    tracing::debug!(index, price = bar.close, shares = trade.shares, "sell");
                    trades.push(trade);
                }

                if position.level_breached(bar.close) {
                    let trade = Self::liquidate(&mut position, bar, index, TradeKind::Exit);
                    tracing::debug!(index, price = bar.close, shares = trade.shares, "exit");
                    trades.push(trade);
                }
            }

            let mark = if last_close.is_finite() { last_close } else { 0.0 };
            states.push(PortfolioState {
                index,
                date: bar.date,
                close: bar.close,
                signal: bar.signal,
                shares: position.shares,
                cash: position.cash,
                value: position.value(mark),
                trade_return: None,
            });
        }

        for i in 1..states.len() {
            let prev = states[i - 1].value;
            if prev != 0.0 {
                states[i].trade_return = Some(states[i].value / prev - 1.0);
            }
        }

        let final_value = states.last().map_or(cfg.initial_cash, |s| s.value);
        let summary = SimulationSummary {
            initial_cash: cfg.initial_cash,
            final_value,
            trade_count: trades.len(),
            total_return_pct: (final_value / cfg.initial_cash - 1.0) * 100.0,
        };
        tracing::info!(
            bars = bars.len(),
            trades = summary.trade_count,
            final_value = summary.final_value,
            total_return_pct = summary.total_return_pct,
            "simulation complete"
        );

        SimulationResult {
            states,
            trades,
            summary,
        }
    }
}
