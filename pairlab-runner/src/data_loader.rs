//! CSV market data for the runner.
//!
//! One file per symbol, `<data_dir>/<SYMBOL>.csv`, with a header row. Column
//! names are matched case-insensitively; `date`, `high`, `low` and `close` are
//! required, `open` and `volume` are optional. Blank, `nan` and `null` price
//! cells load as NaN so that void bars surface in the pipeline rather than
//! being silently dropped here.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use pairlab_core::data::{DataError, MarketDataSource};
use pairlab_core::domain::Bar;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Errors from the CSV loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no data file for '{symbol}' in {}", dir.display())]
    UnknownSymbol { symbol: String, dir: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("{} is missing required column '{column}'", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}: line {line}: cannot parse {column} value '{value}'", path.display())]
    Parse {
        path: PathBuf,
        line: u64,
        column: &'static str,
        value: String,
    },
}

/// Column positions resolved from the header row.
#[derive(Debug, Clone, Copy)]
struct Columns {
    date: usize,
    open: Option<usize>,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord, path: &Path) -> Result<Self, LoadError> {
        let by_name: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
            .collect();
        let required = |column: &'static str| {
            by_name
                .get(column)
                .copied()
                .ok_or_else(|| LoadError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };
        Ok(Self {
            date: required("date")?,
            open: by_name.get("open").copied(),
            high: required("high")?,
            low: required("low")?,
            close: required("close")?,
            volume: by_name.get("volume").copied(),
        })
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    // Timestamps such as "2024-01-02 00:00:00" keep only the date part.
    let raw = raw.split_whitespace().next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

fn parse_price(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Some(f64::NAN);
    }
    raw.parse().ok()
}

fn parse_volume(raw: &str) -> Option<Option<u64>> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("nan") || raw.eq_ignore_ascii_case("null") {
        return Some(None);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Some(Some(v));
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Some(Some(v.round() as u64)),
        _ => None,
    }
}

/// Parse bars from CSV text. `path` is used only for error messages.
pub fn read_bars<R: std::io::Read>(reader: R, path: &Path) -> Result<Vec<Bar>, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let cols = Columns::resolve(rdr.headers().map_err(csv_err)?, path)?;

    let mut bars = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map_or(0, |p| p.line());
        let field = |idx: usize| record.get(idx).unwrap_or("");
        let bad = |column: &'static str, value: &str| LoadError::Parse {
            path: path.to_path_buf(),
            line,
            column,
            value: value.to_string(),
        };

        let raw_date = field(cols.date);
        let date = parse_date(raw_date).ok_or_else(|| bad("date", raw_date))?;
        let price = |column: &'static str, idx: usize| {
            let raw = field(idx);
            parse_price(raw).ok_or_else(|| bad(column, raw))
        };
        let open = match cols.open {
            Some(idx) => Some(price("open", idx)?).filter(|v| !v.is_nan()),
            None => None,
        };
        let volume = match cols.volume {
            Some(idx) => {
                let raw = field(idx);
                parse_volume(raw).ok_or_else(|| bad("volume", raw))?
            }
            None => None,
        };

        bars.push(Bar {
            date,
            open,
            high: price("high", cols.high)?,
            low: price("low", cols.low)?,
            close: price("close", cols.close)?,
            volume,
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

/// Directory of per-symbol CSV files.
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<symbol>.csv`, falling back to the upper-cased symbol.
    pub fn path_for(&self, symbol: &str) -> Option<PathBuf> {
        [symbol.to_string(), symbol.to_ascii_uppercase()]
            .iter()
            .map(|name| self.dir.join(format!("{name}.csv")))
            .find(|p| p.is_file())
    }

    pub fn read(&self, symbol: &str) -> Result<Vec<Bar>, LoadError> {
        let path = self.path_for(symbol).ok_or_else(|| LoadError::UnknownSymbol {
            symbol: symbol.to_string(),
            dir: self.dir.clone(),
        })?;
        let file = std::fs::File::open(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        let bars = read_bars(file, &path)?;
        let void = bars.iter().filter(|b| b.is_void()).count();
        if void > 0 {
            tracing::warn!(symbol, void, path = %path.display(), "void bars in CSV");
        }
        tracing::debug!(symbol, bars = bars.len(), path = %path.display(), "loaded CSV");
        Ok(bars)
    }
}

impl MarketDataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn load(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        self.read(symbol).map_err(|e| match e {
            LoadError::UnknownSymbol { symbol, .. } => DataError::SymbolNotFound { symbol },
            other => DataError::Source {
                source_name: self.name().to_string(),
                message: other.to_string(),
            },
        })
    }
}
