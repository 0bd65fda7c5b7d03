#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and trait definitions for the Ronda dislocation engine.
//!
//! This crate provides the foundational pieces every other Ronda crate
//! builds on: the error type, date-indexed market data containers, rolling
//! statistics, the [`Signal`] trait with its result types, and the run
//! [`Config`].

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod config;
pub mod error;
pub mod signal;
pub mod stats;
pub mod types;

// Re-exports
pub use config::{Config, StressScaling};
pub use error::{Result, RondaError};
pub use signal::{MarketInputs, Signal, SignalKind, SignalReport, SignalResult, SignalSeries};
pub use types::{
    Date, DatedMatrix, HY_OAS, IG_OAS, MarketData, OhlcvColumns, OhlcvPanel, PriceField,
    PriceMatrix, Symbol, TimeSeries,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
        assert!(VERSION.contains('.'));
    }
}
