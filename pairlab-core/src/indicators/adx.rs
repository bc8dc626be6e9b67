//! ADX: Average Directional Index with DI+/DI- and DX.
//!
//! Steps:
//! 1. +DM = up-move if up-move > down-move and up-move > 0, else 0; -DM symmetric.
//!    DM is NaN at bar 0 (no previous bar) rather than zero-filled, so the
//!    first DM window, and with it the first DI, lands at bar `period`
//!    instead of `period - 1`. A zero-filled bar 0 would start DI one bar
//!    earlier on a window that mixes in a move that never happened.
//! 2. +DI = 100 * SMA(+DM) / SMA(TR), -DI likewise, over the same window.
//! 3. DX = 100 * |+DI - -DI| / (+DI + -DI), NaN when the sum is zero.
//! 4. ADX = SMA(DX).
//!
//! On sane bars each DM is bounded by that bar's TR and only one side is
//! non-zero, so DI+, DI-, DX and ADX stay within [0, 100].
//! Lookback: 2 * period - 1 (first DI at `period`, then `period` DX values).

use serde::{Deserialize, Serialize};

use crate::components::indicator::Indicator;
use crate::domain::Bar;
use crate::indicators::atr::true_range;
use crate::indicators::sma::sma_of_series;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

/// Every intermediate series of the ADX computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdxLines {
    pub plus_dm: Vec<f64>,
    pub minus_dm: Vec<f64>,
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub dx: Vec<f64>,
    pub adx: Vec<f64>,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }

    /// Compute DM, DI, DX and ADX in one pass.
    pub fn lines(&self, bars: &[Bar]) -> AdxLines {
        let n = bars.len();
        let mut plus_dm = vec![f64::NAN; n];
        let mut minus_dm = vec![f64::NAN; n];

        for i in 1..n {
            let up = bars[i].high - bars[i - 1].high;
            let down = bars[i - 1].low - bars[i].low;
            if up.is_nan() || down.is_nan() {
                continue;
            }
            plus_dm[i] = if up > down && up > 0.0 { up } else { 0.0 };
            minus_dm[i] = if down > up && down > 0.0 { down } else { 0.0 };
        }

        let avg_tr = sma_of_series(&true_range(bars), self.period);
        let avg_plus = sma_of_series(&plus_dm, self.period);
        let avg_minus = sma_of_series(&minus_dm, self.period);

        let mut plus_di = vec![f64::NAN; n];
        let mut minus_di = vec![f64::NAN; n];
        let mut dx = vec![f64::NAN; n];

        for i in 0..n {
            let tr = avg_tr[i];
            if tr.is_nan() || tr <= 0.0 || avg_plus[i].is_nan() || avg_minus[i].is_nan() {
                continue;
            }
            let pdi = 100.0 * avg_plus[i] / tr;
            let mdi = 100.0 * avg_minus[i] / tr;
            plus_di[i] = pdi;
            minus_di[i] = mdi;

            let sum = pdi + mdi;
            if sum > 0.0 {
                dx[i] = 100.0 * (pdi - mdi).abs() / sum;
            }
        }

        let adx = sma_of_series(&dx, self.period);

        AdxLines {
            plus_dm,
            minus_dm,
            plus_di,
            minus_di,
            dx,
            adx,
        }
    }
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        self.lines(bars).adx
    }
}
