//! Hedge ratio: how many units of leg B offset one unit of leg A.

use serde::{Deserialize, Serialize};

use crate::domain::PairSeries;
use crate::stats::{simple_ols, StatsError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HedgeRatio {
    pub slope: f64,
    pub intercept: f64,
}

/// OLS of `a` on `b` with an intercept. The slope is the hedge ratio.
pub fn estimate_hedge_ratio(a: &[f64], b: &[f64]) -> Result<HedgeRatio, StatsError> {
    let fit = simple_ols(b, a)?;
    Ok(HedgeRatio {
        slope: fit.slope,
        intercept: fit.intercept,
    })
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HedgeRatioEstimator;

impl HedgeRatioEstimator {
    /// Fits on the bars where both legs are present.
    pub fn estimate(&self, pair: &PairSeries) -> Result<HedgeRatio, StatsError> {
        let (a, b) = pair.complete_closes();
        let ratio = estimate_hedge_ratio(&a, &b)?;
        tracing::debug!(slope = ratio.slope, intercept = ratio.intercept, "hedge ratio");
        Ok(ratio)
    }
}
