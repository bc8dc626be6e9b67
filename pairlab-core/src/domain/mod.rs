//! Domain types for PairLab

pub mod bar;
pub mod pair;
pub mod portfolio;
pub mod signal;
pub mod trade;

pub use bar::Bar;
pub use pair::{PairError, PairSeries};
pub use portfolio::{PortfolioState, Position};
pub use signal::Signal;
pub use trade::{Trade, TradeKind};

/// Symbol type alias
pub type Symbol = String;
