//! Feature matrix for regime detection.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::indicators::IndicatorFrame;

/// A per-bar column the regime model can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegimeFeature {
    Adx,
    Rsi,
    Spread,
    Atr,
    Macd,
    /// Close-to-close fractional change of the traded leg.
    Returns,
}

impl RegimeFeature {
    pub fn as_str(self) -> &'static str {
        match self {
            RegimeFeature::Adx => "adx",
            RegimeFeature::Rsi => "rsi",
            RegimeFeature::Spread => "spread",
            RegimeFeature::Atr => "atr",
            RegimeFeature::Macd => "macd",
            RegimeFeature::Returns => "returns",
        }
    }
}

pub fn default_features() -> Vec<RegimeFeature> {
    vec![
        RegimeFeature::Adx,
        RegimeFeature::Rsi,
        RegimeFeature::Spread,
        RegimeFeature::Atr,
    ]
}

/// Borrowed per-bar series the features are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct FeatureInputs<'a> {
    pub frame: &'a IndicatorFrame,
    pub spread: &'a [f64],
    pub closes: &'a [f64],
}

/// Rows with every selected feature finite, plus the bar index of each row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub features: Vec<RegimeFeature>,
    /// `n_rows x n_features`, one row per kept bar.
    pub rows: Array2<f64>,
    pub index: Vec<usize>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.rows.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.len()
    }
}

/// Fractional change versus the previous bar. NaN at bar 0 and wherever the
/// previous close is zero or missing.
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    for i in 1..closes.len() {
        let prev = closes[i - 1];
        if prev != 0.0 {
            out[i] = closes[i] / prev - 1.0;
        }
    }
    out
}

pub fn build_features(inputs: &FeatureInputs<'_>, features: &[RegimeFeature]) -> FeatureMatrix {
    let returns = if features.contains(&RegimeFeature::Returns) {
        pct_returns(inputs.closes)
    } else {
        Vec::new()
    };

    let columns: Vec<&[f64]> = features
        .iter()
        .map(|f| match f {
            RegimeFeature::Adx => inputs.frame.adx.as_slice(),
            RegimeFeature::Rsi => inputs.frame.rsi.as_slice(),
            RegimeFeature::Spread => inputs.spread,
            RegimeFeature::Atr => inputs.frame.atr.as_slice(),
            RegimeFeature::Macd => inputs.frame.macd.as_slice(),
            RegimeFeature::Returns => returns.as_slice(),
        })
        .collect();

    let n = columns.iter().map(|c| c.len()).min().unwrap_or(0);
    let index: Vec<usize> = (0..n)
        .filter(|&i| columns.iter().all(|c| c[i].is_finite()))
        .collect();
    let rows = Array2::from_shape_fn((index.len(), columns.len()), |(r, c)| {
        columns[c][index[r]]
    });

    FeatureMatrix {
        features: features.to_vec(),
        rows,
        index,
    }
}
