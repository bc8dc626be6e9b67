//! Property tests for pipeline invariants.
//!
//! Uses proptest to verify:
//! 1. Simulator accounting: cash and shares never go negative, value identity holds
//! 2. Indicator bounds: RSI and ADX in [0, 100], ATR non-negative
//! 3. Routing preserves bar count and only emits rule output for ruled regimes
//! 4. Spread band classification is monotone in the spread value

use chrono::NaiveDate;
use proptest::prelude::*;
use pairlab_core::components::indicator::Indicator;
use pairlab_core::components::RuleInput;
use pairlab_core::domain::{Bar, Signal, TradeKind};
use pairlab_core::engine::{PortfolioSimulator, SimBar, SimulationConfig};
use pairlab_core::indicators::{Adx, Atr, Rsi};
use pairlab_core::pairs::SpreadBand;
use pairlab_core::strategy::{StrategyRouter, UnroutedPolicy};

fn date(i: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap() + chrono::Days::new(i as u64)
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Short), Just(Signal::Flat), Just(Signal::Long)]
}

fn arb_price() -> impl Strategy<Value = f64> {
    (5.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

fn arb_sim_bars() -> impl Strategy<Value = Vec<SimBar>> {
    prop::collection::vec((arb_price(), 0.0..10.0_f64, arb_signal()), 1..120).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (close, atr, signal))| SimBar {
                date: date(i),
                close,
                atr,
                signal,
            })
            .collect()
    })
}

/// Bars whose high/low envelope always contains the close.
fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((arb_price(), 0.0..5.0_f64, 0.0..5.0_f64), 2..150).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (close, up, down))| Bar::new(date(i), close + up, close - down, close))
            .collect()
    })
}

// ── 1. Simulator accounting ──────────────────────────────────────────

proptest! {
    #[test]
    fn cash_and_shares_never_negative(
        bars in arb_sim_bars(),
        cash in 10.0..5000.0_f64,
    ) {
        let config = SimulationConfig { initial_cash: cash, ..SimulationConfig::default() };
        let result = PortfolioSimulator::new(config).run(&bars);

        prop_assert_eq!(result.states.len(), bars.len());
        for state in &result.states {
            prop_assert!(state.cash >= -1e-9, "cash {} at bar {}", state.cash, state.index);
            let identity = state.cash + state.shares as f64 * state.close;
            prop_assert!((state.value - identity).abs() < 1e-6);
        }
    }

    #[test]
    fn trade_log_replays_to_final_state(bars in arb_sim_bars()) {
        let config = SimulationConfig { initial_cash: 2000.0, ..SimulationConfig::default() };
        let result = PortfolioSimulator::new(config).run(&bars);

        let mut shares: u64 = 0;
        let mut cash = 2000.0;
        let mut last_index = 0;
        for trade in &result.trades {
            prop_assert!(trade.index >= last_index, "trade log out of order");
            last_index = trade.index;
            match trade.kind {
                TradeKind::Buy => shares += trade.shares,
                TradeKind::Sell | TradeKind::Exit => {
                    prop_assert_eq!(trade.shares, shares, "liquidation must close everything");
                    shares = 0;
                }
            }
            cash += trade.cash_flow();
        }

        let last = result.states.last().unwrap();
        prop_assert_eq!(shares, last.shares);
        prop_assert!((cash - last.cash).abs() < 1e-6);
    }

    #[test]
    fn flat_signals_never_trade(closes in prop::collection::vec(arb_price(), 1..60)) {
        let bars: Vec<SimBar> = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| SimBar { date: date(i), close, atr: 1.0, signal: Signal::Flat })
            .collect();
        let result = PortfolioSimulator::new(SimulationConfig::default()).run(&bars);
        prop_assert!(result.trades.is_empty());
        prop_assert!(result.values().iter().all(|&v| v == 100_000.0));
    }
}

// ── 2. Indicator bounds ──────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_bounded(bars in arb_bars(), period in 2usize..20) {
        for v in Rsi::new(period).compute(&bars) {
            if !v.is_nan() {
                prop_assert!((0.0..=100.0).contains(&v), "rsi out of range: {v}");
            }
        }
    }

    #[test]
    fn adx_bounded(bars in arb_bars(), period in 2usize..20) {
        for v in Adx::new(period).compute(&bars) {
            if !v.is_nan() {
                prop_assert!((0.0..=100.0 + 1e-9).contains(&v), "adx out of range: {v}");
            }
        }
    }

    #[test]
    fn atr_non_negative(bars in arb_bars(), period in 1usize..20) {
        let atr = Atr::new(period).compute(&bars);
        prop_assert_eq!(atr.len(), bars.len());
        for v in atr {
            if !v.is_nan() {
                prop_assert!(v >= 0.0, "negative atr: {v}");
            }
        }
    }
}

// ── 3. Routing ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn router_preserves_length(
        rows in prop::collection::vec((arb_price(), arb_signal(), prop::option::of(0usize..4)), 0..80),
        fallback in any::<bool>(),
    ) {
        let inputs: Vec<RuleInput> = rows
            .iter()
            .map(|&(close, combined, _)| RuleInput {
                close,
                combined,
                lower_band: 100.0,
                upper_band: 200.0,
                trend_ema: 150.0,
            })
            .collect();
        let regimes: Vec<Option<usize>> = rows.iter().map(|r| r.2).collect();
        let spread: Vec<Signal> = rows.iter().map(|r| r.1).collect();
        let policy = if fallback { UnroutedPolicy::SpreadFallback } else { UnroutedPolicy::Flat };

        let routed = StrategyRouter::new(policy).route(&inputs, &regimes, &spread);
        prop_assert_eq!(routed.len(), inputs.len());
        for (i, out) in routed.iter().enumerate() {
            match regimes[i] {
                Some(0) | Some(1) => prop_assert!(out.is_some()),
                _ if fallback => prop_assert_eq!(*out, Some(spread[i])),
                _ => prop_assert_eq!(*out, None),
            }
        }
    }
}

// ── 4. Spread band ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn band_classification_monotone(
        spread in prop::collection::vec(-50.0..50.0_f64, 2..100),
        k in 0.5..3.0_f64,
        x in -100.0..100.0_f64,
        dx in 0.0..50.0_f64,
    ) {
        let band = SpreadBand::fit(&spread, k);
        let lo = band.classify(x).as_i8();
        let hi = band.classify(x + dx).as_i8();
        // Higher spread never produces a more bullish signal.
        prop_assert!(hi <= lo, "classify({x})={lo}, classify({})={hi}", x + dx);
    }
}
