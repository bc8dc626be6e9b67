//! Market data access.

pub mod source;

pub use source::{align_on_intersection, DataError, InMemorySource, MarketDataSource};
