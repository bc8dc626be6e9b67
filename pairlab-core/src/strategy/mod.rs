//! Signal blending and regime-conditioned strategy routing.

pub mod combined;
pub mod router;
pub mod rules;

pub use combined::{combined_signals, CombinedSignals, SignalConfig};
pub use router::{StrategyRouter, UnroutedPolicy};
pub use rules::{MeanReversion, TrendFollowing};
