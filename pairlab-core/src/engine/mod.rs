//! Backtesting engine: a single-position, one-unit-lot portfolio simulator.

pub mod simulator;

pub use simulator::{
    PortfolioSimulator, SignalSource, SimBar, SimulationConfig, SimulationResult,
    SimulationSummary,
};
