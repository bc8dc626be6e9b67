//! Criterion benchmarks for PairLab hot paths.
//!
//! Benchmarks:
//! 1. Indicator bank (full per-leg indicator frame)
//! 2. Statistics (Engle-Granger gate with ADF lag search)
//! 3. Gaussian HMM fit (Baum-Welch from k-means init)
//! 4. Portfolio simulator (per-bar loop)

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;

use pairlab_core::domain::{Bar, Signal};
use pairlab_core::engine::{PortfolioSimulator, SimBar, SimulationConfig};
use pairlab_core::indicators::{IndicatorBank, IndicatorConfig};
use pairlab_core::pairs::engle_granger;
use pairlab_core::regime::{GaussianHmm, HmmConfig};
use pairlab_core::rng::RngHierarchy;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_bars(n: usize) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.01;
            Bar::new(
                base_date + chrono::Duration::days(i as i64),
                close + 1.5,
                close - 1.5,
                close,
            )
        })
        .collect()
}

fn make_legs(n: usize) -> (Vec<f64>, Vec<f64>) {
    let b: Vec<f64> = (0..n)
        .map(|i| 50.0 + (i as f64 * 0.05).sin() * 5.0 + i as f64 * 0.02)
        .collect();
    let a: Vec<f64> = b
        .iter()
        .enumerate()
        .map(|(i, x)| 2.0 * x + (i as f64 * 1.7).sin())
        .collect();
    (a, b)
}

/// Three well-separated 4-d clusters laid out in contiguous blocks.
fn make_observations(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, 4), |(i, j)| {
        let block = (i * 3 / n) as f64;
        let wobble = (i as f64 * 0.37).sin() * 0.3;
        match j {
            0 => block + wobble,
            1 => -block + 0.5 * wobble,
            2 => 2.0 * block - wobble,
            _ => wobble,
        }
    })
}

// ── 1. Indicator Bank ────────────────────────────────────────────────

fn bench_indicator_bank(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicator_bank");
    let bank = IndicatorBank::new(IndicatorConfig::default());

    for &bar_count in &[252, 1260, 2520] {
        let bars = make_bars(bar_count);
        group.bench_with_input(
            BenchmarkId::new("compute", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| bank.compute(black_box(&bars)));
            },
        );
    }

    group.finish();
}

// ── 2. Cointegration Gate ────────────────────────────────────────────

fn bench_cointegration(c: &mut Criterion) {
    let mut group = c.benchmark_group("engle_granger");

    for &bar_count in &[252, 1260] {
        let (a, b) = make_legs(bar_count);
        group.bench_with_input(
            BenchmarkId::new("adf_lag_search", bar_count),
            &bar_count,
            |bench, _| {
                bench.iter(|| engle_granger(black_box(&a), black_box(&b), 0.05));
            },
        );
    }

    group.finish();
}

// ── 3. HMM Fit ───────────────────────────────────────────────────────

fn bench_hmm(c: &mut Criterion) {
    let mut group = c.benchmark_group("gaussian_hmm");
    group.sample_size(20);

    let obs = make_observations(750);
    let config = HmmConfig {
        max_iter: 100,
        ..HmmConfig::default()
    };
    let hierarchy = RngHierarchy::new(42);

    group.bench_function("fit_3_states_750_rows", |b| {
        b.iter(|| {
            let mut rng = hierarchy.rng_for("hmm_init", 0);
            GaussianHmm::fit(black_box(&obs), &config, &mut rng)
        });
    });

    let mut rng = hierarchy.rng_for("hmm_init", 0);
    if let Ok(fit) = GaussianHmm::fit(&obs, &config, &mut rng) {
        group.bench_function("viterbi_750_rows", |b| {
            b.iter(|| fit.model.decode(black_box(&obs)));
        });
    }

    group.finish();
}

// ── 4. Portfolio Simulator ───────────────────────────────────────────

fn bench_simulator(c: &mut Criterion) {
    let mut group = c.benchmark_group("portfolio_simulator");
    let simulator = PortfolioSimulator::new(SimulationConfig::default());

    for &bar_count in &[1260, 10_000] {
        let bars: Vec<SimBar> = make_bars(bar_count)
            .iter()
            .enumerate()
            .map(|(i, bar)| SimBar {
                date: bar.date,
                close: bar.close,
                atr: 1.0,
                signal: match i % 7 {
                    0 | 1 => Signal::Long,
                    5 => Signal::Short,
                    _ => Signal::Flat,
                },
            })
            .collect();
        group.bench_with_input(
            BenchmarkId::new("run", bar_count),
            &bar_count,
            |b, _| {
                b.iter(|| simulator.run(black_box(&bars)));
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_indicator_bank,
    bench_cointegration,
    bench_hmm,
    bench_simulator
);
criterion_main!(benches);
