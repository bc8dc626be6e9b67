//! PairSeries: two date-aligned bar sequences traded as one relationship.
//!
//! Leg A is the dependent series of the hedge regression and the leg the
//! simulator trades. Leg B is the independent series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bar::{closes, Bar};

/// Structural problems with a pair, raised before any computation starts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PairError {
    #[error("series for '{symbol}' is empty")]
    Empty { symbol: String },

    #[error("length mismatch: '{symbol_a}' has {len_a} bars, '{symbol_b}' has {len_b}")]
    LengthMismatch {
        symbol_a: String,
        symbol_b: String,
        len_a: usize,
        len_b: usize,
    },

    #[error("dates diverge at index {index}: {date_a} vs {date_b}")]
    DateMismatch {
        index: usize,
        date_a: NaiveDate,
        date_b: NaiveDate,
    },

    #[error("dates for '{symbol}' are not strictly increasing at index {index}")]
    Unordered { symbol: String, index: usize },

    #[error("both legs use the same symbol '{0}'")]
    SameSymbol(String),
}

/// Two aligned bar sequences.
///
/// Construction validates that both legs are non-empty, equally long and carry
/// the same date at every index. Gaps in the calendar are not filled: rolling
/// windows treat consecutive entries as consecutive bars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairSeries {
    symbol_a: String,
    symbol_b: String,
    a: Vec<Bar>,
    b: Vec<Bar>,
}

impl PairSeries {
    pub fn new(
        symbol_a: impl Into<String>,
        symbol_b: impl Into<String>,
        a: Vec<Bar>,
        b: Vec<Bar>,
    ) -> Result<Self, PairError> {
        let symbol_a = symbol_a.into();
        let symbol_b = symbol_b.into();

        if symbol_a == symbol_b {
            return Err(PairError::SameSymbol(symbol_a));
        }
        if a.is_empty() {
            return Err(PairError::Empty { symbol: symbol_a });
        }
        if b.is_empty() {
            return Err(PairError::Empty { symbol: symbol_b });
        }
        if a.len() != b.len() {
            return Err(PairError::LengthMismatch {
                len_a: a.len(),
                len_b: b.len(),
                symbol_a,
                symbol_b,
            });
        }
        for (index, (bar_a, bar_b)) in a.iter().zip(&b).enumerate() {
            if bar_a.date != bar_b.date {
                return Err(PairError::DateMismatch {
                    index,
                    date_a: bar_a.date,
                    date_b: bar_b.date,
                });
            }
            if index > 0 && a[index - 1].date >= bar_a.date {
                return Err(PairError::Unordered {
                    symbol: symbol_a,
                    index,
                });
            }
        }

        Ok(Self {
            symbol_a,
            symbol_b,
            a,
            b,
        })
    }

    pub fn symbol_a(&self) -> &str {
        &self.symbol_a
    }

    pub fn symbol_b(&self) -> &str {
        &self.symbol_b
    }

    pub fn a(&self) -> &[Bar] {
        &self.a
    }

    pub fn b(&self) -> &[Bar] {
        &self.b
    }

    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Always false for a constructed pair; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.a.iter().map(|b| b.date).collect()
    }

    pub fn closes_a(&self) -> Vec<f64> {
        closes(&self.a)
    }

    pub fn closes_b(&self) -> Vec<f64> {
        closes(&self.b)
    }

    /// Closes of both legs on the bars where neither leg is void, in bar
    /// order. Statistics that need complete observations fit on these.
    pub fn complete_closes(&self) -> (Vec<f64>, Vec<f64>) {
        self.a
            .iter()
            .zip(&self.b)
            .filter(|(x, y)| !x.is_void() && !y.is_void())
            .map(|(x, y)| (x.close, y.close))
            .unzip()
    }

    /// Number of bars where either leg is void.
    pub fn void_count(&self) -> usize {
        self.a
            .iter()
            .zip(&self.b)
            .filter(|(x, y)| x.is_void() || y.is_void())
            .count()
    }
}
