//! Annotated frame export (CSV). One row per bar; NaN marks warm-up.

use std::io::Write;
use std::path::Path;

use pairlab_core::AnnotatedFrame;

use super::{create, io_err};
use crate::reporting::ReportError;

const HEADER: &str = "index,date,close_a,close_b,spread,spread_z,spread_signal,atr,rsi,adx,macd,\
bollinger_lower,bollinger_upper,ema_trend,stop_loss,take_profit,rsi_signal,adx_signal,combined,\
regime,routed";

fn opt<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

pub fn write_frame_csv(path: &Path, frame: &AnnotatedFrame) -> Result<(), ReportError> {
    let mut file = create(path)?;
    let mut write = || -> std::io::Result<()> {
        writeln!(file, "{HEADER}")?;
        for r in &frame.rows {
            writeln!(
                file,
                "{},{},{:.6},{:.6},{:.6},{:.6},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{},{},{},{},{}",
                r.index,
                r.date,
                r.close_a,
                r.close_b,
                r.spread,
                r.spread_z,
                r.spread_signal.as_i8(),
                r.atr,
                r.rsi,
                r.adx,
                r.macd,
                r.bollinger_lower,
                r.bollinger_upper,
                r.ema_trend,
                r.stop_loss,
                r.take_profit,
                r.rsi_signal,
                r.adx_signal,
                r.combined.as_i8(),
                opt(r.regime),
                opt(r.routed.map(|s| s.as_i8())),
            )?;
        }
        file.flush()
    };
    write().map_err(io_err(path))
}
