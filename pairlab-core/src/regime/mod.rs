//! Regime detection: standardized indicator features fed to a Gaussian HMM.
//!
//! The model is fitted on the whole sample and decoded over the same rows, so
//! labels are not causal. Bars dropped for NaN features get no label.

pub mod features;
pub mod hmm;
pub mod kmeans;
pub mod labeling;
pub mod scaler;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rng::RngHierarchy;

pub use features::{build_features, default_features, FeatureInputs, FeatureMatrix, RegimeFeature};
pub use hmm::{GaussianHmm, HmmConfig, HmmFit};
pub use labeling::{RegimeLabeling, StateDiagnostics};
pub use scaler::StandardScaler;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RegimeError {
    #[error("not enough complete feature rows to fit {states} states (got {rows})")]
    InsufficientData { rows: usize, states: usize },

    #[error("no regime features selected")]
    NoFeatures,

    #[error("log-likelihood became non-finite at iteration {iteration}")]
    NonFiniteLikelihood { iteration: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConfig {
    pub n_states: usize,
    pub max_iter: usize,
    pub tol: f64,
    pub min_covar: f64,
    pub seed: u64,
    pub features: Vec<RegimeFeature>,
    pub labeling: RegimeLabeling,
}

impl Default for RegimeConfig {
    fn default() -> Self {
        let hmm = HmmConfig::default();
        Self {
            n_states: hmm.n_states,
            max_iter: hmm.max_iter,
            tol: hmm.tol,
            min_covar: hmm.min_covar,
            seed: 42,
            features: default_features(),
            labeling: RegimeLabeling::default(),
        }
    }
}

impl RegimeConfig {
    pub fn hmm(&self) -> HmmConfig {
        HmmConfig {
            n_states: self.n_states,
            max_iter: self.max_iter,
            tol: self.tol,
            min_covar: self.min_covar,
        }
    }
}

/// Per-bar regime labels plus everything needed to reproduce them.
#[derive(Debug, Clone, PartialEq)]
pub struct RegimeAssignment {
    pub labels: Vec<Option<usize>>,
    pub model: GaussianHmm,
    pub scaler: StandardScaler,
    pub converged: bool,
    pub iterations: usize,
    pub log_likelihood: f64,
    pub diagnostics: Vec<StateDiagnostics>,
}

impl RegimeAssignment {
    /// Bars per label, in label order.
    pub fn occupancy(&self) -> Vec<usize> {
        let mut counts = vec![0; self.model.n_states];
        for label in self.labels.iter().flatten() {
            counts[*label] += 1;
        }
        counts
    }
}

#[derive(Debug, Clone, Default)]
pub struct RegimeDetector {
    config: RegimeConfig,
}

impl RegimeDetector {
    pub fn new(config: RegimeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RegimeConfig {
        &self.config
    }

    pub fn detect(&self, inputs: &FeatureInputs<'_>) -> Result<RegimeAssignment, RegimeError> {
        if self.config.features.is_empty() {
            return Err(RegimeError::NoFeatures);
        }
        let matrix = build_features(inputs, &self.config.features);
        if matrix.n_rows() < self.config.n_states {
            return Err(RegimeError::InsufficientData {
                rows: matrix.n_rows(),
                states: self.config.n_states,
            });
        }
        tracing::debug!(
            rows = matrix.n_rows(),
            dropped = inputs.closes.len().saturating_sub(matrix.n_rows()),
            features = ?matrix.features,
            "regime feature matrix"
        );

        let scaler = StandardScaler::fit(&matrix.rows);
        let obs = scaler.transform(&matrix.rows);

        let mut rng = RngHierarchy::new(self.config.seed).rng_for("hmm_init", 0);
        let fit = GaussianHmm::fit(&obs, &self.config.hmm(), &mut rng)?;
        let mut model = fit.model;
        let mut states = model.decode(&obs);

        let returns = features::pct_returns(inputs.closes);
        let mut diagnostics =
            labeling::state_diagnostics(&states, &matrix.index, &returns, model.n_states);

        if self.config.labeling == RegimeLabeling::ByVolatility {
            let order = labeling::volatility_order(&diagnostics);
            let mut relabel = vec![0; order.len()];
            for (new, &old) in order.iter().enumerate() {
                relabel[old] = new;
            }
            model = model.permuted(&order);
            for s in &mut states {
                *s = relabel[*s];
            }
            diagnostics =
                labeling::state_diagnostics(&states, &matrix.index, &returns, model.n_states);
        }

        for d in &diagnostics {
            tracing::debug!(
                state = d.state,
                count = d.count,
                mean_return = d.mean_return,
                return_volatility = d.return_volatility,
                "regime state"
            );
        }

        let mut labels = vec![None; inputs.closes.len()];
        for (&i, &s) in matrix.index.iter().zip(&states) {
            if let Some(slot) = labels.get_mut(i) {
                *slot = Some(s);
            }
        }

        Ok(RegimeAssignment {
            labels,
            model,
            scaler,
            converged: fit.converged,
            iterations: fit.iterations,
            log_likelihood: fit.log_likelihood,
            diagnostics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::IndicatorFrame;

    fn three_block_inputs() -> (IndicatorFrame, Vec<f64>, Vec<f64>) {
        let n = 150;
        let mut frame = IndicatorFrame::default();
        let mut spread = Vec::with_capacity(n);
        let mut closes = Vec::with_capacity(n);
        let mut price = 100.0;
        for i in 0..n {
            let block = i / 50;
            let wobble = ((i * 7919) % 13) as f64 / 13.0 - 0.5;
            frame.adx.push(10.0 + 20.0 * block as f64 + wobble);
            frame.rsi.push(30.0 + 20.0 * block as f64 + wobble);
            frame.atr.push(1.0 + block as f64 + 0.1 * wobble);
            spread.push(-1.0 + block as f64 + 0.05 * wobble);
            price *= 1.0 + 0.001 * (block as f64 + 1.0) * wobble;
            closes.push(price);
        }
        frame.adx[0] = f64::NAN;
        (frame, spread, closes)
    }

    #[test]
    fn labels_cover_blocks_and_skip_nan_rows() {
        let (frame, spread, closes) = three_block_inputs();
        let inputs = FeatureInputs {
            frame: &frame,
            spread: &spread,
            closes: &closes,
        };
        let out = RegimeDetector::default().detect(&inputs).unwrap();
        assert_eq!(out.labels.len(), 150);
        assert_eq!(out.labels[0], None);
        assert!(out.labels.iter().flatten().all(|l| *l < 3));
        let a = out.labels[10];
        let b = out.labels[60];
        let c = out.labels[110];
        assert!(a != b && b != c && a != c);
        assert_eq!(out.occupancy().iter().sum::<usize>(), 149);
    }

    #[test]
    fn by_volatility_puts_calm_block_first() {
        let (frame, spread, closes) = three_block_inputs();
        let inputs = FeatureInputs {
            frame: &frame,
            spread: &spread,
            closes: &closes,
        };
        let config = RegimeConfig {
            labeling: RegimeLabeling::ByVolatility,
            ..RegimeConfig::default()
        };
        let out = RegimeDetector::new(config).detect(&inputs).unwrap();
        assert_eq!(out.labels[10], Some(0));
        assert_eq!(out.labels[110], Some(2));
        let vols: Vec<f64> = out.diagnostics.iter().map(|d| d.return_volatility).collect();
        assert!(vols[0] <= vols[1] && vols[1] <= vols[2]);
    }

    #[test]
    fn empty_feature_list_is_error() {
        let (frame, spread, closes) = three_block_inputs();
        let inputs = FeatureInputs {
            frame: &frame,
            spread: &spread,
            closes: &closes,
        };
        let config = RegimeConfig {
            features: Vec::new(),
            ..RegimeConfig::default()
        };
        assert_eq!(
            RegimeDetector::new(config).detect(&inputs).unwrap_err(),
            RegimeError::NoFeatures
        );
    }

    #[test]
    fn too_few_rows_is_error() {
        let frame = IndicatorFrame {
            adx: vec![20.0, 30.0],
            rsi: vec![50.0, 60.0],
            atr: vec![1.0, 2.0],
            ..IndicatorFrame::default()
        };
        let spread = [0.0, 1.0];
        let closes = [10.0, 11.0];
        let inputs = FeatureInputs {
            frame: &frame,
            spread: &spread,
            closes: &closes,
        };
        assert!(matches!(
            RegimeDetector::default().detect(&inputs),
            Err(RegimeError::InsufficientData { rows: 2, states: 3 })
        ));
    }
}
