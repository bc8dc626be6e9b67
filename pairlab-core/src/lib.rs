//! PairLab Core: statistical pairs-trading pipeline.
//!
//! This crate contains the whole analysis and simulation stack:
//! - Domain types (bars, pairs, signals, positions, trades)
//! - Indicator bank (ATR, ADX/DI, MACD, RSI, Bollinger, EMA)
//! - Statistics (OLS, ADF, MacKinnon p-values) and the Engle-Granger gate
//! - Spread band signal and hedge ratio
//! - Gaussian HMM regime detection
//! - Regime-conditioned strategy routing
//! - One-unit-lot portfolio simulator

pub mod components;
pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod fingerprint;
pub mod indicators;
pub mod pairs;
pub mod pipeline;
pub mod regime;
pub mod rng;
pub mod stats;
pub mod strategy;

pub use config::{ConfigError, PipelineConfig};
pub use pipeline::{
    run_pairs_pipeline, simulate, AnnotatedFrame, FrameRow, PipelineError, PipelineOutput,
};
