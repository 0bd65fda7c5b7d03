#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! Pricing-dislocation engine for ETFs.
//!
//! ronda watches how far each fund trades from a fair-value reference,
//! how its returns diverge from that reference, how its volume and price
//! behave, and how stressed credit markets are. The readings are blended
//! into one composite score per ticker, mapped to BUY, HOLD or SELL, and
//! replayed historically by a cost-aware backtest.
//!
//! This is the umbrella crate: it re-exports the sub-crates and adds the
//! two end-to-end pipelines, [`Monitor`] and [`Backtest`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use ronda::prelude::*;
//! use ronda::data::Universe;
//!
//! # fn main() -> ronda::Result<()> {
//! let config = Config::default();
//! let universe = Universe::load(&config.universe)?;
//! let snapshot = MarketSnapshot::load(&config, &universe, PriceMatrix::default(), start, end)?;
//!
//! let report = Monitor::new(config).run(&snapshot.inputs())?;
//! for row in report.actionable() {
//!     println!("{} {} {:.2}", row.ticker, row.action, row.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Core types, configuration and the [`Signal`] trait
//! - [`signals`] - The four signal families and their registry
//! - [`combine`] - Composite scoring and the rules engine
//! - [`eval`] - Backtest simulation and performance metrics
//! - [`data`] - Price store, benchmark references and universes
//! - [`fred`] - Credit spread client

pub mod monitor;
pub mod snapshot;

pub use monitor::{Monitor, MonitorReport, ScoredRow};
pub use snapshot::MarketSnapshot;

/// Version of the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core types, configuration and traits.
pub mod traits {
    pub use ronda_traits::*;
}

pub use ronda_traits::{Config, Result, RondaError, Signal, SignalKind};
pub use ronda_traits::types::{Date, MarketData, PriceMatrix, Symbol, TimeSeries};

/// Signal calculators.
///
/// | Family | Scope | Measures |
/// |--------|-------|----------|
/// | `premdisc` | per ticker | price relative to the reference, z-scored |
/// | `divergence` | per ticker | price/reference ratio, z-scored |
/// | `volume` | per ticker | volume spikes and moves beyond the ATR band |
/// | `cross_asset` | global | credit spread change, scaled by the VIX level |
pub mod signals {
    pub use ronda_signals::*;
}

/// Composite scoring and the rules engine.
pub mod combine {
    pub use ronda_combine::*;
}

pub use ronda_combine::{Action, CompositeScorer, RulesEngine};

/// Backtest simulation and performance metrics.
///
/// Positions decided at the close of day `T` earn the return of `T+1`;
/// costs are charged on the absolute change in weights.
pub mod eval {
    pub use ronda_eval::*;
}

pub use ronda_eval::{Backtest, BacktestResult, PerformanceMetrics};

/// Price store, benchmark references and universe profiles.
pub mod data {
    pub use ronda_data::*;
}

/// FRED credit spread client.
///
/// Requires the `FRED_API_KEY` environment variable, or a `.env` file.
pub mod fred {
    pub use ronda_fred::*;
}

/// Commonly used types.
///
/// ```ignore
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::traits::{MarketInputs, SignalReport, SignalResult, SignalSeries};
    pub use crate::{
        Action, Backtest, BacktestResult, Config, Date, MarketSnapshot, Monitor, MonitorReport,
        PerformanceMetrics, PriceMatrix, Result, RondaError, Signal, SignalKind, Symbol,
    };
}
