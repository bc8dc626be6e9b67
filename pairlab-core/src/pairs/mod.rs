//! Pair statistics: cointegration gate, hedge ratio, spread signal.

pub mod coint;
pub mod hedge;
pub mod spread;

pub use coint::{engle_granger, CointegrationGate, CointegrationResult};
pub use hedge::{estimate_hedge_ratio, HedgeRatio, HedgeRatioEstimator};
pub use spread::{compute_spread, SpreadBand, SpreadSignalGenerator, SpreadSignals};
