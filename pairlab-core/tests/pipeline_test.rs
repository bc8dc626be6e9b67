//! End-to-end pipeline tests on synthetic pairs.
//!
//! Leg B is a Gaussian random walk. A cointegrated leg A is `2 * B + noise`;
//! an independent leg A is a second random walk from a different stream.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pairlab_core::domain::{Bar, PairSeries, Signal};
use pairlab_core::engine::SignalSource;
use pairlab_core::pairs::{CointegrationGate, HedgeRatioEstimator};
use pairlab_core::rng::RngHierarchy;
use pairlab_core::{run_pairs_pipeline, simulate, PipelineConfig, PipelineError};

// ── Helpers ──────────────────────────────────────────────────────────

fn normal(rng: &mut StdRng) -> f64 {
    // Box-Muller
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

fn random_walk(rng: &mut StdRng, n: usize, start: f64) -> Vec<f64> {
    let mut price = start;
    (0..n)
        .map(|_| {
            price += normal(rng);
            price
        })
        .collect()
}

fn bars_from(closes: &[f64]) -> Vec<Bar> {
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar::new(start + chrono::Days::new(i as u64), c + 0.75, c - 0.75, c))
        .collect()
}

fn pair_from(a: &[f64], b: &[f64]) -> PairSeries {
    PairSeries::new("AAA", "BBB", bars_from(a), bars_from(b)).unwrap()
}

fn cointegrated_closes(seed: u64, n: usize) -> (Vec<f64>, Vec<f64>) {
    let streams = RngHierarchy::new(seed);
    let b = random_walk(&mut streams.rng_for("leg_b", 0), n, 100.0);
    let mut noise = streams.rng_for("noise", 0);
    let a: Vec<f64> = b.iter().map(|x| 2.0 * x + 5.0 + normal(&mut noise)).collect();
    (a, b)
}

fn cointegrated_pair(seed: u64, n: usize) -> PairSeries {
    let (a, b) = cointegrated_closes(seed, n);
    pair_from(&a, &b)
}

fn independent_pair(seed: u64, n: usize) -> PairSeries {
    let streams = RngHierarchy::new(seed);
    let a = random_walk(&mut streams.rng_for("leg_a", 0), n, 200.0);
    let b = random_walk(&mut streams.rng_for("leg_b", 0), n, 100.0);
    pair_from(&a, &b)
}

// ── Cointegration gate ───────────────────────────────────────────────

#[test]
fn gate_accepts_linear_combination() {
    let result = CointegrationGate::default()
        .test(&cointegrated_pair(7, 300))
        .unwrap();
    assert!(result.is_cointegrated, "p = {}", result.p_value);
    assert!(result.p_value < 0.01);
    assert!(result.test_statistic < result.critical_values.one);
}

#[test]
fn gate_rejects_independent_walks() {
    let rejected = (0..10u64)
        .filter(|&seed| {
            !CointegrationGate::default()
                .test(&independent_pair(seed, 300))
                .unwrap()
                .is_cointegrated
        })
        .count();
    assert!(rejected >= 7, "only {rejected} of 10 independent pairs rejected");
}

#[test]
fn hedge_ratio_recovers_slope() {
    let hedge = HedgeRatioEstimator.estimate(&cointegrated_pair(11, 400)).unwrap();
    assert!((hedge.slope - 2.0).abs() < 0.05, "slope = {}", hedge.slope);
}

// ── Full pipeline ────────────────────────────────────────────────────

#[test]
fn pipeline_rejects_uncointegrated_pair() {
    let config = PipelineConfig::default();
    let pair = (0..10u64)
        .map(|seed| independent_pair(seed, 300))
        .find(|p| !CointegrationGate::default().test(p).unwrap().is_cointegrated)
        .unwrap();

    match run_pairs_pipeline(&pair, &config) {
        Err(PipelineError::NotCointegrated {
            symbol_a,
            symbol_b,
            p_value,
        }) => {
            assert_eq!(symbol_a, "AAA");
            assert_eq!(symbol_b, "BBB");
            assert!(p_value >= config.significance);
        }
        other => panic!("expected NotCointegrated, got {other:?}"),
    }
}

#[test]
fn pipeline_annotates_every_bar() {
    let pair = cointegrated_pair(3, 300);
    let config = PipelineConfig::default();
    let output = run_pairs_pipeline(&pair, &config).unwrap();

    assert_eq!(output.frame.len(), pair.len());
    assert_eq!(output.regimes.labels.len(), pair.len());
    assert!((output.final_spread - output.frame.rows[299].spread).abs() < 1e-12);

    let k = config.regime.n_states;
    for row in &output.frame.rows {
        if let Some(label) = row.regime {
            assert!(label < k, "label {label} out of range");
        }
    }
    // Warmup rows have NaN indicators and therefore no regime.
    assert_eq!(output.frame.rows[0].regime, None);
    assert!(output.frame.rows[299].regime.is_some());
    assert_eq!(output.regimes.occupancy().iter().sum::<usize>(),
        output.frame.rows.iter().filter(|r| r.regime.is_some()).count());
}

#[test]
fn routed_signals_follow_regime_rules() {
    let output = run_pairs_pipeline(&cointegrated_pair(5, 300), &PipelineConfig::default()).unwrap();
    for row in &output.frame.rows {
        match row.regime {
            Some(0) | Some(1) => assert!(row.routed.is_some()),
            _ => assert_eq!(row.routed, None),
        }
    }
}

#[test]
fn pipeline_is_deterministic() {
    let pair = cointegrated_pair(21, 250);
    let config = PipelineConfig::default();

    let first = run_pairs_pipeline(&pair, &config).unwrap();
    let second = run_pairs_pipeline(&pair, &config).unwrap();
    assert_eq!(first.regimes.model, second.regimes.model);
    assert_eq!(first.regimes.labels, second.regimes.labels);

    let sim_first = simulate(&first.frame, &config.simulation);
    let sim_second = simulate(&second.frame, &config.simulation);
    assert_eq!(
        serde_json::to_string(&(&first.frame, &sim_first)).unwrap(),
        serde_json::to_string(&(&second.frame, &sim_second)).unwrap()
    );
}

#[test]
fn different_seed_still_labels_in_range() {
    let pair = cointegrated_pair(21, 250);
    let mut config = PipelineConfig::default();
    config.regime.seed = 1234;
    config.regime.n_states = 2;
    let output = run_pairs_pipeline(&pair, &config).unwrap();
    assert!(output.regimes.labels.iter().flatten().all(|&l| l < 2));
}

// ── Simulation on the annotated frame ────────────────────────────────

#[test]
fn simulation_covers_every_bar() {
    let output = run_pairs_pipeline(&cointegrated_pair(9, 300), &PipelineConfig::default()).unwrap();
    for source in [SignalSource::Routed, SignalSource::Combined, SignalSource::Spread] {
        let mut sim_config = PipelineConfig::default().simulation;
        sim_config.signal_source = source;
        let result = simulate(&output.frame, &sim_config);

        assert_eq!(result.states.len(), output.frame.len());
        for (state, row) in result.states.iter().zip(&output.frame.rows) {
            assert_eq!(state.date, row.date);
            assert_eq!(state.signal, output.frame.signal_at(row.index, source));
            assert!(state.cash >= 0.0);
        }
    }
}

#[test]
fn spread_signals_match_band() {
    let output = run_pairs_pipeline(&cointegrated_pair(13, 300), &PipelineConfig::default()).unwrap();
    let band = output.spread_band;
    for row in &output.frame.rows {
        let expected = if row.spread > band.upper() {
            Signal::Short
        } else if row.spread < band.lower() {
            Signal::Long
        } else {
            Signal::Flat
        };
        assert_eq!(row.spread_signal, expected);
    }
}

// ── Void bars ────────────────────────────────────────────────────────

#[test]
fn void_bar_is_carried_through_pipeline() {
    let (mut a, b) = cointegrated_closes(7, 300);
    a[150] = f64::NAN;
    let pair = pair_from(&a, &b);
    assert_eq!(pair.void_count(), 1);

    let config = PipelineConfig::default();
    let output = run_pairs_pipeline(&pair, &config).unwrap();
    assert!(output.cointegration.is_cointegrated);
    assert!(output.hedge_ratio.slope.is_finite());

    let row = &output.frame.rows[150];
    assert!(row.spread.is_nan());
    assert_eq!(row.spread_signal, Signal::Flat);
    assert_eq!(row.regime, None);
    assert_eq!(row.routed, None);
    assert!(output.frame.rows[151].spread.is_finite());
}

#[test]
fn void_bar_marks_at_last_close() {
    let (mut a, b) = cointegrated_closes(7, 300);
    a[150] = f64::NAN;
    let output = run_pairs_pipeline(&pair_from(&a, &b), &PipelineConfig::default()).unwrap();

    for source in [SignalSource::Routed, SignalSource::Combined, SignalSource::Spread] {
        let mut sim_config = PipelineConfig::default().simulation;
        sim_config.signal_source = source;
        let result = simulate(&output.frame, &sim_config);

        let before = &result.states[149];
        let void = &result.states[150];
        assert!(void.value.is_finite());
        assert_eq!(void.value, before.value);
        assert_eq!(void.cash, before.cash);
        assert_eq!(void.shares, before.shares);
        assert!(result.trades.iter().all(|t| t.index != 150));
    }
}
