//! Augmented Dickey-Fuller regression without deterministic terms.
//!
//! Regresses Δe[t] on e[t-1] and `lag` lagged differences. The lag is chosen
//! by minimum AIC over 0..=maxlag, with every candidate fitted on the same
//! sample; the winning lag is then refitted on the longest sample it allows.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::{first_non_finite, least_squares, StatsError};

/// Test statistic and the regression that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdfResult {
    pub statistic: f64,
    pub used_lag: usize,
    pub nobs: usize,
}

/// Schwert's rule of thumb, capped so the regression keeps enough rows.
pub fn default_maxlag(n: usize) -> Option<usize> {
    let rule = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    (n / 2).checked_sub(1).map(|cap| cap.min(rule))
}

/// Design matrix and targets for a regression with `lag` lagged differences,
/// starting at difference index `start`. Columns are [e[t-1], Δe[t-1], ..].
fn design(series: &[f64], diffs: &[f64], lag: usize, start: usize) -> (DMatrix<f64>, DVector<f64>) {
    let rows = diffs.len() - start;
    let x = DMatrix::from_fn(rows, lag + 1, |r, c| {
        let j = start + r;
        if c == 0 {
            series[j]
        } else {
            diffs[j - c]
        }
    });
    let y = DVector::from_column_slice(&diffs[start..]);
    (x, y)
}

/// Run the ADF regression on `series` with AIC lag selection.
pub fn adf_test(series: &[f64]) -> Result<AdfResult, StatsError> {
    let n = series.len();
    if let Some(index) = first_non_finite(series) {
        return Err(StatsError::NonFinite { index });
    }
    let maxlag = default_maxlag(n)
        .filter(|_| n >= 4)
        .ok_or(StatsError::InsufficientData {
            what: "ADF regression",
            needed: 4,
            got: n,
        })?;

    let diffs: Vec<f64> = series.windows(2).map(|w| w[1] - w[0]).collect();

    let mut best: Option<(f64, usize)> = None;
    for lag in 0..=maxlag {
        let (rows, targets) = design(series, &diffs, lag, maxlag);
        let aic = match least_squares(&rows, &targets) {
            Ok(fit) => fit.aic(),
            Err(StatsError::Singular | StatsError::InsufficientData { .. }) => continue,
            Err(e) => return Err(e),
        };
        if best.map_or(true, |(b, _)| aic < b) {
            best = Some((aic, lag));
        }
    }
    let (_, used_lag) = best.ok_or(StatsError::InsufficientData {
        what: "ADF regression",
        needed: 2 * maxlag + 2,
        got: n,
    })?;

    let (rows, targets) = design(series, &diffs, used_lag, used_lag);
    let fit = least_squares(&rows, &targets)?;
    tracing::trace!(used_lag, nobs = fit.nobs, "adf regression fitted");

    Ok(AdfResult {
        statistic: fit.t_value(0),
        used_lag,
        nobs: fit.nobs,
    })
}
