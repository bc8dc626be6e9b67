//! Ordinary least squares.
//!
//! `simple_ols` is the closed-form y = a + b x fit used for hedge ratios and
//! the first Engle-Granger step. `least_squares` handles small
//! multi-regressor problems (the ADF regression) on nalgebra matrices and
//! also returns coefficient standard errors.

use nalgebra::{DMatrix, DVector};

use super::{first_non_finite, mean, StatsError};

/// Result of a closed-form y = intercept + slope * x regression.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleFit {
    pub intercept: f64,
    pub slope: f64,
    pub residuals: Vec<f64>,
    pub r_squared: f64,
}

/// Closed-form OLS of `y` on `x` with an intercept.
pub fn simple_ols(x: &[f64], y: &[f64]) -> Result<SimpleFit, StatsError> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            left: x.len(),
            right: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(StatsError::InsufficientData {
            what: "linear regression",
            needed: 2,
            got: x.len(),
        });
    }
    if let Some(index) = first_non_finite(x).or_else(|| first_non_finite(y)) {
        return Err(StatsError::NonFinite { index });
    }

    let mx = mean(x);
    let my = mean(y);
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }

    if sxx <= 0.0 {
        return Err(StatsError::ZeroVariance {
            what: "independent series",
        });
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let residuals: Vec<f64> = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| yi - intercept - slope * xi)
        .collect();
    let ssr: f64 = residuals.iter().map(|r| r * r).sum();
    let r_squared = if syy > 0.0 { 1.0 - ssr / syy } else { 1.0 };

    Ok(SimpleFit {
        intercept,
        slope,
        residuals,
        r_squared,
    })
}

/// Result of a multi-regressor least-squares fit.
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    pub coefficients: DVector<f64>,
    pub std_errors: DVector<f64>,
    pub ssr: f64,
    pub nobs: usize,
}

impl LeastSquares {
    /// t-ratio of coefficient `i`.
    pub fn t_value(&self, i: usize) -> f64 {
        self.coefficients[i] / self.std_errors[i]
    }

    /// Gaussian log-likelihood at the MLE of the error variance.
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion; every regressor counts as a parameter.
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.coefficients.len() as f64
    }
}

/// Least squares of `y` on the columns of `x` (no implicit intercept).
///
/// Solves the normal equations through a Cholesky factor of X'X, whose
/// inverse also gives the coefficient standard errors.
pub fn least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<LeastSquares, StatsError> {
    let (n, k) = x.shape();
    if n != y.len() {
        return Err(StatsError::LengthMismatch {
            left: n,
            right: y.len(),
        });
    }
    if k == 0 || n <= k {
        return Err(StatsError::InsufficientData {
            what: "least squares",
            needed: k + 1,
            got: n,
        });
    }

    let xtx = x.transpose() * x;
    let xty = x.transpose() * y;
    let scale = xtx.diagonal().amax();

    let chol = xtx.cholesky().ok_or(StatsError::Singular)?;
    // A pivot that collapses relative to the largest diagonal means collinear columns.
    let min_pivot = chol
        .l_dirty()
        .diagonal()
        .iter()
        .fold(f64::INFINITY, |acc, v| acc.min(v * v));
    if !(min_pivot > scale * 1e-13) {
        return Err(StatsError::Singular);
    }

    let coefficients = chol.solve(&xty);
    let residuals = y - x * &coefficients;
    let ssr = residuals.norm_squared();

    let sigma2 = ssr / (n - k) as f64;
    let std_errors = chol.inverse().diagonal().map(|v| (sigma2 * v).sqrt());

    Ok(LeastSquares {
        coefficients,
        std_errors,
        ssr,
        nobs: n,
    })
}
