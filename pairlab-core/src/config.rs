//! Pipeline configuration.
//!
//! Every section is `#[serde(default)]`, so a config file only needs the keys
//! it changes. `validate` runs before any computation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::SimulationConfig;
use crate::indicators::IndicatorConfig;
use crate::regime::RegimeConfig;
use crate::strategy::{SignalConfig, UnroutedPolicy};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be at least 1")]
    ZeroPeriod { name: &'static str },

    #[error("{name} must be finite (got {value})")]
    NonFinite { name: &'static str, value: f64 },

    #[error("{name} must not be negative (got {value})")]
    Negative { name: &'static str, value: f64 },

    #[error("{lower} ({lower_value}) must be below {upper} ({upper_value})")]
    Ordering {
        lower: &'static str,
        lower_value: f64,
        upper: &'static str,
        upper_value: f64,
    },

    #[error("significance must lie strictly between 0 and 1 (got {0})")]
    Significance(f64),

    #[error("regime model needs at least one state")]
    NoStates,

    #[error("min_covar must be positive (got {0})")]
    MinCovar(f64),

    #[error("initial cash must be positive (got {0})")]
    NonPositiveCash(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cointegration p-value threshold.
    pub significance: f64,
    pub routing: UnroutedPolicy,
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    pub regime: RegimeConfig,
    pub simulation: SimulationConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            significance: 0.05,
            routing: UnroutedPolicy::default(),
            indicators: IndicatorConfig::default(),
            signal: SignalConfig::default(),
            regime: RegimeConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(name, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

fn ordered(
    lower: &'static str,
    lower_value: f64,
    upper: &'static str,
    upper_value: f64,
) -> Result<(), ConfigError> {
    if lower_value < upper_value {
        Ok(())
    } else {
        Err(ConfigError::Ordering {
            lower,
            lower_value,
            upper,
            upper_value,
        })
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(ConfigError::Significance(self.significance));
        }

        for (name, period) in self.indicators.periods() {
            if period == 0 {
                return Err(ConfigError::ZeroPeriod { name });
            }
        }
        non_negative("bollinger_multiplier", self.indicators.bollinger_multiplier)?;
        let ind = &self.indicators;
        ordered("macd_fast", ind.macd_fast as f64, "macd_slow", ind.macd_slow as f64)?;

        let s = &self.signal;
        finite("rsi_weight", s.rsi_weight)?;
        finite("adx_weight", s.adx_weight)?;
        finite("rsi_oversold", s.rsi_oversold)?;
        finite("rsi_overbought", s.rsi_overbought)?;
        finite("adx_trend", s.adx_trend)?;
        ordered("rsi_oversold", s.rsi_oversold, "rsi_overbought", s.rsi_overbought)?;
        non_negative("spread_band_k", s.spread_band_k)?;

        let r = &self.regime;
        if r.n_states == 0 {
            return Err(ConfigError::NoStates);
        }
        if r.max_iter == 0 {
            return Err(ConfigError::ZeroPeriod { name: "max_iter" });
        }
        finite("tol", r.tol)?;
        if !(r.min_covar > 0.0) || !r.min_covar.is_finite() {
            return Err(ConfigError::MinCovar(r.min_covar));
        }

        let sim = &self.simulation;
        if !(sim.initial_cash > 0.0) || !sim.initial_cash.is_finite() {
            return Err(ConfigError::NonPositiveCash(sim.initial_cash));
        }
        non_negative("stop_loss_atr", sim.stop_loss_atr)?;
        non_negative("take_profit_atr", sim.take_profit_atr)?;

        Ok(())
    }
}
