//! Run orchestration: wires data loading, the pairs pipeline, simulation
//! and metrics into one `BacktestReport`.
//!
//! Two entry points:
//! - `run_pair()`: loads both legs from the configured CSV directory. Used by the CLI.
//! - `run_pair_from_data()`: takes a pre-loaded `PairSeries`. No I/O.

use serde::Serialize;
use thiserror::Error;

use pairlab_core::data::{DataError, MarketDataSource};
use pairlab_core::domain::PairSeries;
use pairlab_core::engine::SimulationResult;
use pairlab_core::fingerprint::RunFingerprint;
use pairlab_core::pairs::{CointegrationResult, HedgeRatio, SpreadBand};
use pairlab_core::regime::{GaussianHmm, StateDiagnostics};
use pairlab_core::{run_pairs_pipeline, simulate, AnnotatedFrame, PipelineConfig, PipelineError};

use crate::config::{ConfigError, RunConfig, RunId};
use crate::data_loader::CsvSource;
use crate::metrics::PerformanceMetrics;
use crate::reporting::ReportError;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("report error: {0}")]
    Report(#[from] ReportError),
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

/// Fitted regime model and its per-state summary.
#[derive(Debug, Clone, Serialize)]
pub struct RegimeSummary {
    pub model: GaussianHmm,
    pub converged: bool,
    pub iterations: usize,
    pub log_likelihood: f64,
    pub diagnostics: Vec<StateDiagnostics>,
}

/// Complete result of one pair run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    pub schema_version: u32,
    pub run_id: RunId,
    pub fingerprint: RunFingerprint,
    pub config: PipelineConfig,
    pub cointegration: CointegrationResult,
    pub hedge_ratio: HedgeRatio,
    pub final_spread: f64,
    pub spread_band: SpreadBand,
    pub regimes: RegimeSummary,
    pub frame: AnnotatedFrame,
    pub simulation: SimulationResult,
    pub metrics: PerformanceMetrics,
    pub warmup_bars: usize,
    pub void_bars: usize,
}

/// Load both legs from `config.pair.data_dir`, aligned on shared dates.
pub fn load_pair(config: &RunConfig) -> Result<PairSeries, RunError> {
    let source = CsvSource::new(&config.pair.data_dir);
    let pair = source.load_pair(&config.pair.symbol_a, &config.pair.symbol_b)?;
    tracing::info!(
        source = source.name(),
        symbol_a = pair.symbol_a(),
        symbol_b = pair.symbol_b(),
        bars = pair.len(),
        "loaded pair"
    );
    Ok(pair)
}

/// Load data, then run. Used by the CLI.
pub fn run_pair(config: &RunConfig) -> Result<BacktestReport, RunError> {
    config.validate()?;
    let pair = load_pair(config)?;
    run_pair_from_data(config, &pair)
}

/// Run the full pipeline and simulation on pre-loaded data.
pub fn run_pair_from_data(
    config: &RunConfig,
    pair: &PairSeries,
) -> Result<BacktestReport, RunError> {
    let fingerprint = config.fingerprint(pair)?;
    let run_id = fingerprint.run_id();
    let span = tracing::info_span!("run", %run_id);
    let _enter = span.enter();

    let output = run_pairs_pipeline(pair, &config.pipeline)?;
    let simulation = simulate(&output.frame, &config.pipeline.simulation);
    let metrics = PerformanceMetrics::compute(
        &simulation,
        &output.regimes.labels,
        output.regimes.model.n_states,
        &config.metrics,
    );
    let warmup_bars = pairlab_core::indicators::IndicatorBank::new(
        config.pipeline.indicators.clone(),
    )
    .warmup_bars();

    tracing::info!(
        p_value = output.cointegration.p_value,
        hedge_ratio = output.hedge_ratio.slope,
        trades = metrics.trade_count,
        total_return = metrics.total_return,
        sharpe = ?metrics.sharpe,
        "run complete"
    );

    let regimes = output.regimes;
    Ok(BacktestReport {
        schema_version: SCHEMA_VERSION,
        run_id,
        fingerprint,
        config: config.pipeline.clone(),
        cointegration: output.cointegration,
        hedge_ratio: output.hedge_ratio,
        final_spread: output.final_spread,
        spread_band: output.spread_band,
        regimes: RegimeSummary {
            model: regimes.model,
            converged: regimes.converged,
            iterations: regimes.iterations,
            log_likelihood: regimes.log_likelihood,
            diagnostics: regimes.diagnostics,
        },
        frame: output.frame,
        simulation,
        metrics,
        warmup_bars,
        void_bars: pair.void_count(),
    })
}
