//! Market data source trait and pair alignment.
//!
//! Sources return ordered bars for one symbol. `load_pair` aligns two symbols
//! on the dates they share; bars on dates only one leg has are dropped, so no
//! price is ever forward-filled.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{Bar, PairError, PairSeries};

#[derive(Debug, Error)]
pub enum DataError {
    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no overlapping dates between '{symbol_a}' and '{symbol_b}'")]
    NoOverlap { symbol_a: String, symbol_b: String },

    #[error(transparent)]
    Pair(#[from] PairError),

    #[error("data source '{source_name}' failed: {message}")]
    Source {
        source_name: String,
        message: String,
    },
}

/// Trait for per-symbol bar providers (CSV files, in-memory fixtures, ...).
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name (e.g., "csv").
    fn name(&self) -> &str;

    /// Bars for `symbol`, ascending by date.
    fn load(&self, symbol: &str) -> Result<Vec<Bar>, DataError>;

    /// Load both legs and keep only the dates they have in common.
    fn load_pair(&self, symbol_a: &str, symbol_b: &str) -> Result<PairSeries, DataError> {
        let a = self.load(symbol_a)?;
        let b = self.load(symbol_b)?;
        let (a, b) = align_on_intersection(a, b);
        if a.is_empty() {
            return Err(DataError::NoOverlap {
                symbol_a: symbol_a.to_string(),
                symbol_b: symbol_b.to_string(),
            });
        }
        tracing::debug!(
            source = self.name(),
            symbol_a,
            symbol_b,
            bars = a.len(),
            "aligned pair"
        );
        Ok(PairSeries::new(symbol_a, symbol_b, a, b)?)
    }
}

/// Keep bars whose date appears in both inputs, sorted ascending.
pub fn align_on_intersection(a: Vec<Bar>, b: Vec<Bar>) -> (Vec<Bar>, Vec<Bar>) {
    let dates_a: BTreeSet<NaiveDate> = a.iter().map(|bar| bar.date).collect();
    let dates_b: BTreeSet<NaiveDate> = b.iter().map(|bar| bar.date).collect();
    let common: BTreeSet<NaiveDate> = dates_a.intersection(&dates_b).copied().collect();

    let pick = |bars: Vec<Bar>| -> Vec<Bar> {
        let mut by_date: HashMap<NaiveDate, Bar> = HashMap::new();
        for bar in bars {
            if common.contains(&bar.date) {
                by_date.insert(bar.date, bar);
            }
        }
        common.iter().filter_map(|d| by_date.remove(d)).collect()
    };

    (pick(a), pick(b))
}

/// Bars held in memory, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    bars: HashMap<String, Vec<Bar>>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        self.bars.insert(symbol.into(), bars);
        self
    }
}

impl MarketDataSource for InMemorySource {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        self.bars
            .get(symbol)
            .cloned()
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> Bar {
        Bar::new(
            NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            close + 1.0,
            close - 1.0,
            close,
        )
    }

    #[test]
    fn pair_keeps_common_dates_only() {
        let source = InMemorySource::new()
            .with_symbol(
                "AAA",
                vec![
                    bar("2024-01-02", 10.0),
                    bar("2024-01-03", 11.0),
                    bar("2024-01-04", 12.0),
                ],
            )
            .with_symbol(
                "BBB",
                vec![bar("2024-01-02", 20.0), bar("2024-01-04", 22.0)],
            );

        let pair = source.load_pair("AAA", "BBB").unwrap();
        assert_eq!(pair.len(), 2);
        assert_eq!(pair.closes_a(), vec![10.0, 12.0]);
        assert_eq!(pair.closes_b(), vec![20.0, 22.0]);
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let (a, b) = align_on_intersection(
            vec![bar("2024-01-03", 2.0), bar("2024-01-02", 1.0)],
            vec![bar("2024-01-02", 5.0), bar("2024-01-03", 6.0)],
        );
        assert_eq!(a[0].close, 1.0);
        assert_eq!(b[1].close, 6.0);
    }

    #[test]
    fn missing_symbol_is_error() {
        let err = InMemorySource::new().load("ZZZ").unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn disjoint_dates_are_error() {
        let source = InMemorySource::new()
            .with_symbol("AAA", vec![bar("2024-01-02", 1.0)])
            .with_symbol("BBB", vec![bar("2024-01-03", 1.0)]);
        assert!(matches!(
            source.load_pair("AAA", "BBB"),
            Err(DataError::NoOverlap { .. })
        ));
    }
}
