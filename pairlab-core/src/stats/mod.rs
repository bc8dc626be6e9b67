//! Statistics for the cointegration gate.
//!
//! - Descriptive helpers (mean, variance)
//! - Ordinary least squares (closed form, and Cholesky-solved via nalgebra)
//! - Augmented Dickey-Fuller regression with AIC lag selection
//! - MacKinnon response-surface p-values and critical values

pub mod adf;
pub mod mackinnon;
pub mod ols;

use thiserror::Error;

pub use adf::{adf_test, AdfResult};
pub use ols::{least_squares, simple_ols, LeastSquares, SimpleFit};

/// Numeric degeneracy and sample-size failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatsError {
    #[error("{what} has zero variance")]
    ZeroVariance { what: &'static str },

    #[error("insufficient data for {what}: need at least {needed} observations, got {got}")]
    InsufficientData {
        what: &'static str,
        needed: usize,
        got: usize,
    },

    #[error("design matrix is singular")]
    Singular,

    #[error("input series lengths differ ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    #[error("input contains non-finite values at index {index}")]
    NonFinite { index: usize },
}

/// Arithmetic mean. Returns NaN on empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Variance with `ddof` delta degrees of freedom (0 = population, 1 = sample).
/// Returns NaN when `values.len() <= ddof`.
pub fn variance(values: &[f64], ddof: usize) -> f64 {
    if values.len() <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - ddof) as f64
}

/// Index of the first non-finite value, if any.
pub(crate) fn first_non_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_finite())
}
