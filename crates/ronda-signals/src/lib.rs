//! Dislocation signal calculators for the ronda engine.
//!
//! This crate provides the four calculators behind the composite score:
//! - Premium/Discount: market price versus NAV (or a benchmark proxy)
//! - Volume/Liquidity: abnormal volume and intraday range
//! - Divergence: price relative to a peer benchmark
//! - Cross-Asset Stress: credit spread and volatility overlay (global)
//!
//! Each calculator produces rolling z-scores (or, for the stress overlay, a
//! 0-3 intensity) in two modes: the latest reading, or the full history.
//!
//! # Example
//!
//! ```ignore
//! use ronda_signals::registry::{available_signals, build_signals};
//!
//! let signals = build_signals(&config);
//! for signal in &signals {
//!     let report = signal.latest(&inputs)?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cross_asset;
pub mod divergence;
pub mod premium_discount;
pub mod registry;
pub mod volume_liquidity;

mod relative;

#[cfg(test)]
mod test_support;

// Re-export key types
pub use cross_asset::{CrossAssetStress, CrossAssetStressConfig};
pub use divergence::{Divergence, DivergenceConfig};
pub use premium_discount::{PremiumDiscount, PremiumDiscountConfig};
pub use registry::{SignalCategory, SignalInfo, SignalScope, build_signals};
pub use volume_liquidity::{VolumeLiquidity, VolumeLiquidityConfig};
