//! Report sinks: where a finished `BacktestReport` goes.

pub mod artifacts;
pub mod summary;

use std::path::PathBuf;

use thiserror::Error;

use crate::runner::BacktestReport;

pub use artifacts::{ArtifactPaths, ArtifactWriter};
pub use summary::StdoutSummary;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Json {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Consumer of finished runs.
pub trait ReportSink {
    fn emit(&mut self, report: &BacktestReport) -> Result<(), ReportError>;
}
