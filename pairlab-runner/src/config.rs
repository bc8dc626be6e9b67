//! Run configuration: which pair, where its data lives, pipeline parameters
//! and where artifacts go.
//!
//! Loaded from TOML. Every section is `#[serde(default)]`; a file only needs
//! the keys it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pairlab_core::domain::PairSeries;
use pairlab_core::fingerprint::RunFingerprint;
use pairlab_core::PipelineConfig;

/// Unique identifier for a run (content-addressable hash prefix).
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid pipeline parameter: {0}")]
    Invalid(#[from] pairlab_core::ConfigError),

    #[error("pair symbols must be set (got '{symbol_a}' / '{symbol_b}')")]
    MissingSymbols { symbol_a: String, symbol_b: String },

    #[error("failed to fingerprint config: {0}")]
    Fingerprint(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairSection {
    /// Dependent leg; the simulator trades this one.
    pub symbol_a: String,
    pub symbol_b: String,
    /// Directory holding one `<SYMBOL>.csv` per symbol.
    pub data_dir: PathBuf,
}

impl Default for PairSection {
    fn default() -> Self {
        Self {
            symbol_a: String::new(),
            symbol_b: String::new(),
            data_dir: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Per-bar risk-free rate subtracted before the Sharpe ratio.
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            periods_per_year: 252.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub dir: PathBuf,
    /// Write the artifact directory in addition to the stdout summary.
    pub artifacts: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("runs"),
            artifacts: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub pair: PairSection,
    pub pipeline: PipelineConfig,
    pub metrics: MetricsConfig,
    pub output: OutputSection,
}

impl RunConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded run config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let pair = &self.pair;
        if pair.symbol_a.trim().is_empty() || pair.symbol_b.trim().is_empty() {
            return Err(ConfigError::MissingSymbols {
                symbol_a: pair.symbol_a.clone(),
                symbol_b: pair.symbol_b.clone(),
            });
        }
        self.pipeline.validate()?;
        Ok(())
    }

    /// Fingerprint of this config applied to `pair`.
    pub fn fingerprint(&self, pair: &PairSeries) -> Result<RunFingerprint, ConfigError> {
        Ok(RunFingerprint::new(pair, &self.pipeline)?)
    }

    /// Deterministic run id: identical config and data give the same id.
    pub fn run_id(&self, pair: &PairSeries) -> Result<RunId, ConfigError> {
        Ok(self.fingerprint(pair)?.run_id())
    }
}
