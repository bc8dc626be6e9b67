//! Run manifest export (JSON).

use std::path::Path;

use serde::Serialize;

use pairlab_core::fingerprint::RunFingerprint;
use pairlab_core::pairs::{CointegrationResult, HedgeRatio, SpreadBand};
use pairlab_core::PipelineConfig;

use super::io_err;
use crate::metrics::PerformanceMetrics;
use crate::reporting::ReportError;
use crate::runner::{BacktestReport, RegimeSummary};

/// Everything about a run except the per-bar tables.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest<'a> {
    pub schema_version: u32,
    pub run_id: &'a str,
    pub fingerprint: &'a RunFingerprint,
    pub config: &'a PipelineConfig,
    pub cointegration: &'a CointegrationResult,
    pub hedge_ratio: &'a HedgeRatio,
    pub final_spread: f64,
    pub spread_band: &'a SpreadBand,
    pub regimes: &'a RegimeSummary,
    pub metrics: &'a PerformanceMetrics,
    pub warmup_bars: usize,
    pub void_bars: usize,
}

impl<'a> RunManifest<'a> {
    pub fn from_report(report: &'a BacktestReport) -> Self {
        Self {
            schema_version: report.schema_version,
            run_id: &report.run_id,
            fingerprint: &report.fingerprint,
            config: &report.config,
            cointegration: &report.cointegration,
            hedge_ratio: &report.hedge_ratio,
            final_spread: report.final_spread,
            spread_band: &report.spread_band,
            regimes: &report.regimes,
            metrics: &report.metrics,
            warmup_bars: report.warmup_bars,
            void_bars: report.void_bars,
        }
    }
}

pub fn write_manifest(path: &Path, report: &BacktestReport) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(&RunManifest::from_report(report)).map_err(
        |source| ReportError::Json {
            what: "run manifest",
            source,
        },
    )?;
    std::fs::write(path, json).map_err(io_err(path))
}
