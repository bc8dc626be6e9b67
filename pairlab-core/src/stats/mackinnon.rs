//! MacKinnon (1994, 2010) response surfaces for residual-based unit-root
//! tests with a constant and two cointegrating variables.
//!
//! Coefficients are stored in increasing power order.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

const TAU_MAX: f64 = 0.92;
const TAU_MIN: f64 = -18.86;
const TAU_STAR: f64 = -2.62;

const TAU_SMALL_P: [f64; 3] = [2.92, 1.5012, 0.039_796];
const TAU_LARGE_P: [f64; 4] = [2.1945, 0.646_95, -0.291_98, -0.042_377];

const CRIT_1: [f64; 3] = [-3.896_44, -10.9519, -33.527];
const CRIT_5: [f64; 3] = [-3.336_13, -6.1101, -6.823];
const CRIT_10: [f64; 3] = [-3.044_45, -4.2412, -2.720];

/// Finite-sample critical values at the 1%, 5% and 10% levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriticalValues {
    pub one: f64,
    pub five: f64,
    pub ten: f64,
}

fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().rev().fold(0.0, |acc, c| acc * x + c)
}

/// Approximate asymptotic p-value of an Engle-Granger tau statistic.
pub fn mackinnon_p(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }
    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    match Normal::new(0.0, 1.0) {
        Ok(normal) => normal.cdf(polyval(coefficients, statistic)),
        Err(_) => f64::NAN,
    }
}

/// Critical values for a regression with `nobs` observations.
pub fn mackinnon_crit(nobs: usize) -> CriticalValues {
    let inv = 1.0 / nobs as f64;
    CriticalValues {
        one: polyval(&CRIT_1, inv),
        five: polyval(&CRIT_5, inv),
        ten: polyval(&CRIT_10, inv),
    }
}
