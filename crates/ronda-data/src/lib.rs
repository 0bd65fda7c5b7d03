//! Data collaborators for the ronda engine.
//!
//! - [`PriceStore`]: OHLCV bars from per-ticker CSV files
//! - [`BenchmarkProvider`]: benchmark closes used as NAV proxies
//! - [`Universe`]: ticker lists with static filters
//!
//! Providers return empty results rather than errors when a ticker has no
//! data; the pipeline decides whether an empty input is fatal.

#![warn(missing_docs)]

pub mod benchmark;
pub mod store;
pub mod universe;

#[cfg(test)]
mod test_support;

pub use benchmark::BenchmarkProvider;
pub use store::PriceStore;
pub use universe::{Universe, UniverseEntry};
