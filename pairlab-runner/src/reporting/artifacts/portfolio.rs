//! Per-bar portfolio snapshot export (CSV).

use std::io::Write;
use std::path::Path;

use pairlab_core::domain::PortfolioState;

use super::{create, io_err};
use crate::reporting::ReportError;

pub fn write_portfolio_csv(path: &Path, states: &[PortfolioState]) -> Result<(), ReportError> {
    let mut file = create(path)?;
    let mut write = || -> std::io::Result<()> {
        writeln!(file, "index,date,close,signal,shares,cash,value,trade_return")?;
        for s in states {
            let ret = s.trade_return.map(|r| format!("{r:.8}")).unwrap_or_default();
            writeln!(
                file,
                "{},{},{:.4},{},{},{:.4},{:.4},{}",
                s.index,
                s.date,
                s.close,
                s.signal.as_i8(),
                s.shares,
                s.cash,
                s.value,
                ret
            )?;
        }
        file.flush()
    };
    write().map_err(io_err(path))
}
