//! Backtesting and performance measurement for ronda.
//!
//! This crate replays the dislocation pipeline over history:
//! - Series-mode signal streams combined into daily composite scores
//! - A two-state hold simulation with capped position sizing
//! - Lagged portfolio returns net of turnover costs
//! - Performance statistics of the resulting equity curve
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_eval::Backtest;
//!
//! let result = Backtest::new(config).run(&inputs, start, end)?;
//! for (name, value) in result.metrics.entries() {
//!     println!("{name}: {value:.4}");
//! }
//! ```

pub mod backtest;
pub mod metrics;
pub mod position;

// Re-export main types
pub use backtest::{Backtest, BacktestResult};
pub use metrics::{PerformanceMetrics, max_drawdown};
pub use position::{hold_targets, size_positions};
