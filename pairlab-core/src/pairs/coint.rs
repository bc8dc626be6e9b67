//! Engle-Granger two-step cointegration test.

use serde::{Deserialize, Serialize};

use crate::domain::PairSeries;
use crate::stats::mackinnon::{mackinnon_crit, mackinnon_p, CriticalValues};
use crate::stats::{adf_test, simple_ols, StatsError};

/// Smallest sample the test accepts.
pub const MIN_OBSERVATIONS: usize = 20;

/// R² above which the legs are treated as perfectly collinear.
const COLLINEAR_R2: f64 = 1.0 - 100.0 * 1.490_116_119_384_765_6e-8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CointegrationResult {
    pub is_cointegrated: bool,
    pub p_value: f64,
    pub test_statistic: f64,
    pub used_lag: usize,
    pub critical_values: CriticalValues,
}

/// Test whether `a` and `b` are cointegrated at `significance`.
///
/// Step one regresses `a` on `b` with an intercept; step two runs the ADF
/// regression on the residuals and maps its statistic through MacKinnon's
/// two-variable response surface.
pub fn engle_granger(
    a: &[f64],
    b: &[f64],
    significance: f64,
) -> Result<CointegrationResult, StatsError> {
    if a.len() < MIN_OBSERVATIONS {
        return Err(StatsError::InsufficientData {
            what: "cointegration test",
            needed: MIN_OBSERVATIONS,
            got: a.len(),
        });
    }

    let fit = simple_ols(b, a)?;
    let critical_values = mackinnon_crit(a.len() - 1);

    if fit.r_squared >= COLLINEAR_R2 {
        tracing::warn!(
            r_squared = fit.r_squared,
            "legs are perfectly collinear; residuals carry no information"
        );
        return Ok(CointegrationResult {
            is_cointegrated: true,
            p_value: 0.0,
            test_statistic: f64::NEG_INFINITY,
            used_lag: 0,
            critical_values,
        });
    }

    let adf = adf_test(&fit.residuals)?;
    let p_value = mackinnon_p(adf.statistic);

    Ok(CointegrationResult {
        is_cointegrated: p_value < significance,
        p_value,
        test_statistic: adf.statistic,
        used_lag: adf.used_lag,
        critical_values,
    })
}

/// Gate that decides whether a pair is tradable at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CointegrationGate {
    significance: f64,
}

impl Default for CointegrationGate {
    fn default() -> Self {
        Self { significance: 0.05 }
    }
}

impl CointegrationGate {
    pub fn new(significance: f64) -> Self {
        Self { significance }
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    /// Runs on the bars where both legs are present; void bars are skipped.
    pub fn test(&self, pair: &PairSeries) -> Result<CointegrationResult, StatsError> {
        let (a, b) = pair.complete_closes();
        let result = engle_granger(&a, &b, self.significance)?;
        tracing::info!(
            symbol_a = pair.symbol_a(),
            symbol_b = pair.symbol_b(),
            skipped = pair.len() - a.len(),
            statistic = result.test_statistic,
            p_value = result.p_value,
            used_lag = result.used_lag,
            "cointegration test"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn walk(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut level = 100.0;
        (0..n)
            .map(|_| {
                level += rng.gen_range(-1.0..1.0);
                level
            })
            .collect()
    }

    #[test]
    fn linked_series_are_cointegrated() {
        let b = walk(250, 3);
        let mut rng = StdRng::seed_from_u64(4);
        let a: Vec<f64> = b
            .iter()
            .map(|x| 2.0 * x + 5.0 + rng.gen_range(-0.5..0.5))
            .collect();
        let result = engle_granger(&a, &b, 0.05).unwrap();
        assert!(result.is_cointegrated, "p = {}", result.p_value);
        assert!(result.test_statistic < result.critical_values.five);
    }

    #[test]
    fn collinear_series_short_circuit() {
        let b: Vec<f64> = (0..40).map(|i| 50.0 + (i as f64 * 0.3).sin() * 4.0).collect();
        let a: Vec<f64> = b.iter().map(|x| 3.0 * x - 1.0).collect();
        let result = engle_granger(&a, &b, 0.05).unwrap();
        assert!(result.is_cointegrated);
        assert_eq!(result.p_value, 0.0);
        assert_eq!(result.test_statistic, f64::NEG_INFINITY);
    }

    #[test]
    fn short_sample_is_error() {
        let b = walk(19, 1);
        let err = engle_granger(&b, &b, 0.05).unwrap_err();
        assert!(matches!(
            err,
            StatsError::InsufficientData { needed: 20, got: 19, .. }
        ));
    }

    #[test]
    fn constant_leg_b_is_zero_variance() {
        let a = walk(30, 2);
        let err = engle_granger(&a, &[5.0; 30], 0.05).unwrap_err();
        assert!(matches!(err, StatsError::ZeroVariance { .. }));
    }

    #[test]
    fn p_value_is_a_probability() {
        let result = engle_granger(&walk(200, 8), &walk(200, 9), 0.05).unwrap();
        assert!((0.0..=1.0).contains(&result.p_value));
        assert_eq!(result.is_cointegrated, result.p_value < 0.05);
    }
}
