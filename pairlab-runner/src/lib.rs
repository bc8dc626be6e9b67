//! PairLab Runner: run orchestration, CSV market data, metrics and reports.
//!
//! This crate builds on `pairlab-core` to provide:
//! - TOML run configuration with deterministic run ids
//! - CSV market data source (one file per symbol)
//! - Single-pair runner producing a `BacktestReport`
//! - Performance metrics over the simulated portfolio
//! - Report sinks: stdout summary and on-disk artifacts

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod reporting;
pub mod runner;

pub use config::{ConfigError, MetricsConfig, OutputSection, PairSection, RunConfig, RunId};
pub use data_loader::{read_bars, CsvSource, LoadError};
pub use metrics::PerformanceMetrics;
pub use reporting::{ArtifactPaths, ArtifactWriter, ReportError, ReportSink, StdoutSummary};
pub use runner::{
    load_pair, run_pair, run_pair_from_data, BacktestReport, RegimeSummary, RunError,
    SCHEMA_VERSION,
};
