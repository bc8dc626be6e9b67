//! Artifact writer for persisting run outputs.
//!
//! Layout: `<output_dir>/<run_id>/{manifest.json, portfolio.csv, trades.csv,
//! trades.json, frame.csv}`. Re-running an identical config on identical data
//! overwrites the same directory with identical files.

mod frame;
mod manifest;
mod portfolio;
mod trades;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use super::{ReportError, ReportSink};
use crate::runner::BacktestReport;

pub use manifest::RunManifest;

/// Artifact paths returned after export.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub manifest: PathBuf,
    pub portfolio_csv: PathBuf,
    pub trades_csv: PathBuf,
    pub trades_json: PathBuf,
    pub frame_csv: PathBuf,
}

/// Writes all artifacts for a run.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    output_dir: PathBuf,
    last: Option<ArtifactPaths>,
}

pub(crate) fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> ReportError + '_ {
    move |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(crate) fn create(path: &Path) -> Result<BufWriter<File>, ReportError> {
    File::create(path).map(BufWriter::new).map_err(io_err(path))
}

impl ArtifactWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            last: None,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Paths written by the most recent `emit`.
    pub fn last_paths(&self) -> Option<&ArtifactPaths> {
        self.last.as_ref()
    }

    pub fn save_run(&self, report: &BacktestReport) -> Result<ArtifactPaths, ReportError> {
        let run_dir = self.output_dir.join(&report.run_id);
        std::fs::create_dir_all(&run_dir).map_err(io_err(&run_dir))?;

        let paths = ArtifactPaths {
            manifest: run_dir.join("manifest.json"),
            portfolio_csv: run_dir.join("portfolio.csv"),
            trades_csv: run_dir.join("trades.csv"),
            trades_json: run_dir.join("trades.json"),
            frame_csv: run_dir.join("frame.csv"),
            run_dir,
        };

        manifest::write_manifest(&paths.manifest, report)?;
        portfolio::write_portfolio_csv(&paths.portfolio_csv, &report.simulation.states)?;
        trades::write_trades_csv(&paths.trades_csv, &report.simulation.trades)?;
        trades::write_trades_json(&paths.trades_json, &report.simulation.trades)?;
        frame::write_frame_csv(&paths.frame_csv, &report.frame)?;

        tracing::info!(dir = %paths.run_dir.display(), "artifacts written");
        Ok(paths)
    }
}

impl ReportSink for ArtifactWriter {
    fn emit(&mut self, report: &BacktestReport) -> Result<(), ReportError> {
        self.last = Some(self.save_run(report)?);
        Ok(())
    }
}
