//! Per-feature standardization.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Mean and population standard deviation per column.
///
/// Columns with zero spread keep a scale of 1 so they map to zero instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Array1<f64>,
    pub scale: Array1<f64>,
}

impl StandardScaler {
    pub fn fit(rows: &Array2<f64>) -> Self {
        let d = rows.ncols();
        let Some(mean) = rows.mean_axis(Axis(0)) else {
            return Self {
                mean: Array1::zeros(d),
                scale: Array1::ones(d),
            };
        };
        let scale = rows
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > 0.0 { s } else { 1.0 });
        Self { mean, scale }
    }

    pub fn transform(&self, rows: &Array2<f64>) -> Array2<f64> {
        (rows - &self.mean) / &self.scale
    }
}
