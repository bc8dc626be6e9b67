//! Plain-text run summary.

use std::io::{self, Write};

use super::{ReportError, ReportSink};
use crate::runner::BacktestReport;

/// Writes the summary block to stdout (or any writer, for tests).
#[derive(Debug)]
pub struct StdoutSummary<W: Write = io::Stdout> {
    out: W,
}

impl StdoutSummary<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> StdoutSummary<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_block(&mut self, report: &BacktestReport) -> io::Result<()> {
        let m = &report.metrics;
        let out = &mut self.out;
        let fmt_opt = |v: Option<f64>| v.map_or_else(|| "n/a".to_string(), |s| format!("{s:.4}"));

        writeln!(out)?;
        writeln!(
            out,
            "Pair: {} / {}  (run {})",
            report.frame.symbol_a, report.frame.symbol_b, report.run_id
        )?;
        writeln!(
            out,
            "Cointegration p-value: {:.4}  Hedge ratio: {:.4}  Final spread: {:.4}",
            report.cointegration.p_value, report.hedge_ratio.slope, report.final_spread
        )?;
        writeln!(out)?;
        writeln!(out, "Backtest Summary:")?;
        writeln!(out, "Initial Cash: ${:.2}", m.initial_value)?;
        writeln!(out, "Final Portfolio Value: ${:.2}", m.final_value)?;
        writeln!(out, "Total Trades Executed: {}", m.trade_count)?;
        writeln!(out, "Total Return: {:.2}%", m.total_return * 100.0)?;
        writeln!(out, "Max Drawdown: {:.2}%", m.max_drawdown * 100.0)?;
        writeln!(
            out,
            "Sharpe Ratio: {}  (annualized {})",
            fmt_opt(m.sharpe),
            fmt_opt(m.annualized_sharpe)
        )?;
        let occupancy: Vec<String> = m
            .regime_occupancy
            .iter()
            .enumerate()
            .map(|(k, n)| format!("{k}:{n}"))
            .collect();
        writeln!(
            out,
            "Regimes: {}  (unlabeled {})",
            occupancy.join(" "),
            m.unlabeled_bars
        )?;
        out.flush()
    }
}

impl<W: Write> ReportSink for StdoutSummary<W> {
    fn emit(&mut self, report: &BacktestReport) -> Result<(), ReportError> {
        self.write_block(report).map_err(|source| ReportError::Io {
            path: "<stdout>".into(),
            source,
        })
    }
}
