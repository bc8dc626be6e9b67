//! Performance metrics: pure functions over the simulated value curve.
//!
//! Every metric takes the per-bar portfolio values and/or the trade log and
//! returns a scalar. Ratios that are undefined on the data (zero volatility,
//! fewer than two returns) are `None`, never zero.

use serde::{Deserialize, Serialize};

use pairlab_core::domain::{PortfolioState, Trade, TradeKind};
use pairlab_core::engine::SimulationResult;

use crate::config::MetricsConfig;

/// Aggregate performance metrics for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub initial_value: f64,
    pub final_value: f64,
    /// Fraction, not percent.
    pub total_return: f64,
    /// Negative fraction (e.g. -0.15 for a 15% drawdown).
    pub max_drawdown: f64,
    /// Per-bar Sharpe ratio.
    pub sharpe: Option<f64>,
    pub annualized_sharpe: Option<f64>,
    pub trade_count: usize,
    pub buys: usize,
    pub sells: usize,
    pub exits: usize,
    pub bars: usize,
    /// Bars that ended with an open position.
    pub bars_in_market: usize,
    /// Bars per regime label, in label order.
    pub regime_occupancy: Vec<usize>,
    /// Bars with no regime label (warm-up or void features).
    pub unlabeled_bars: usize,
}

impl PerformanceMetrics {
    pub fn compute(
        result: &SimulationResult,
        regime_labels: &[Option<usize>],
        n_states: usize,
        config: &MetricsConfig,
    ) -> Self {
        let values = result.values();
        let returns = bar_returns(&result.states);
        let sharpe = sharpe_ratio(&returns, config.risk_free_rate);
        let (occupancy, unlabeled) = regime_occupancy(regime_labels, n_states);
        Self {
            initial_value: result.summary.initial_cash,
            final_value: result.summary.final_value,
            total_return: total_return(result.summary.initial_cash, result.summary.final_value),
            max_drawdown: max_drawdown(&values),
            sharpe,
            annualized_sharpe: sharpe.map(|s| annualize(s, config.periods_per_year)),
            trade_count: result.trades.len(),
            buys: count_kind(&result.trades, TradeKind::Buy),
            sells: count_kind(&result.trades, TradeKind::Sell),
            exits: count_kind(&result.trades, TradeKind::Exit),
            bars: result.states.len(),
            bars_in_market: bars_in_market(&result.states),
            regime_occupancy: occupancy,
            unlabeled_bars: unlabeled,
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return as a fraction: (final - initial) / initial.
pub fn total_return(initial: f64, final_value: f64) -> f64 {
    if initial <= 0.0 {
        return 0.0;
    }
    (final_value - initial) / initial
}

/// Maximum drawdown as a negative fraction.
///
/// Returns 0.0 if the curve is constant or monotonically increasing.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;
    for &v in values.iter().filter(|v| v.is_finite()) {
        if v > peak {
            peak = v;
        }
        if peak > 0.0 {
            let dd = (v - peak) / peak;
            if dd < max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}

/// `(mean(r) - rf) / std(r)` with the sample standard deviation.
///
/// None with fewer than two returns or zero dispersion.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> Option<f64> {
    if returns.len() < 2 {
        return None;
    }
    let mean = mean_f64(returns);
    let std = std_dev(returns);
    if !(std > 1e-15) {
        return None;
    }
    Some((mean - risk_free_rate) / std)
}

pub fn annualize(per_bar_sharpe: f64, periods_per_year: f64) -> f64 {
    per_bar_sharpe * periods_per_year.sqrt()
}

pub fn count_kind(trades: &[Trade], kind: TradeKind) -> usize {
    trades.iter().filter(|t| t.kind == kind).count()
}

pub fn bars_in_market(states: &[PortfolioState]) -> usize {
    states.iter().filter(|s| s.shares > 0).count()
}

/// Counts per label plus the number of unlabeled bars.
///
/// Labels at or above `n_states` widen the count vector rather than panic.
pub fn regime_occupancy(labels: &[Option<usize>], n_states: usize) -> (Vec<usize>, usize) {
    let mut counts = vec![0; n_states];
    let mut unlabeled = 0;
    for label in labels {
        match label {
            Some(l) => {
                if *l >= counts.len() {
                    counts.resize(l + 1, 0);
                }
                counts[*l] += 1;
            }
            None => unlabeled += 1,
        }
    }
    (counts, unlabeled)
}

// ─── Helpers ────────────────────────────────────────────────────────

/// Per-bar returns from the simulator's snapshots; the first bar has none.
pub fn bar_returns(states: &[PortfolioState]) -> Vec<f64> {
    states
        .iter()
        .filter_map(|s| s.trade_return)
        .filter(|r| r.is_finite())
        .collect()
}

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
