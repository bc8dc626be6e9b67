//! Trade log export (CSV/JSON).

use std::io::Write;
use std::path::Path;

use pairlab_core::domain::Trade;

use super::{create, io_err};
use crate::reporting::ReportError;

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<(), ReportError> {
    let mut file = create(path)?;
    let mut write = || -> std::io::Result<()> {
        writeln!(file, "index,date,kind,price,shares,cash_flow")?;
        for t in trades {
            writeln!(
                file,
                "{},{},{},{:.4},{},{:.4}",
                t.index,
                t.date,
                t.kind,
                t.price,
                t.shares,
                t.cash_flow()
            )?;
        }
        file.flush()
    };
    write().map_err(io_err(path))
}

pub fn write_trades_json(path: &Path, trades: &[Trade]) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(trades).map_err(|source| ReportError::Json {
        what: "trades",
        source,
    })?;
    std::fs::write(path, json).map_err(io_err(path))
}
