//! Signal registry for discovering and building the available signals.
//!
//! This module provides metadata for every calculator in ronda-signals and
//! builds the configured calculator set for a run.

use ronda_traits::{Config, Signal, SignalKind};
use serde::{Deserialize, Serialize};

use crate::{
    CrossAssetStress, CrossAssetStressConfig, Divergence, DivergenceConfig, PremiumDiscount,
    PremiumDiscountConfig, VolumeLiquidity, VolumeLiquidityConfig,
};

/// Signal category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalCategory {
    /// Price versus fair value
    Valuation,
    /// Price versus a peer benchmark
    RelativeValue,
    /// Trading activity and liquidity
    Liquidity,
    /// Market-wide stress overlays
    Macro,
}

impl SignalCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Valuation => "Deviation of market price from NAV or its proxy",
            Self::RelativeValue => "Performance relative to a benchmark",
            Self::Liquidity => "Abnormal volume and intraday range",
            Self::Macro => "Credit spread and volatility stress",
        }
    }
}

/// Whether a signal reports per ticker or once for the whole market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalScope {
    /// One reading per ticker
    PerTicker,
    /// One reading broadcast to every ticker
    Global,
}

/// Metadata about a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Unique identifier for the signal
    pub name: &'static str,

    /// Family used by the composite scorer
    pub kind: SignalKind,

    /// Category classification
    pub category: SignalCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Default lookback in observations
    pub typical_lookback: usize,

    /// Per-ticker or global
    pub scope: SignalScope,
}

/// Get information about all available signals, in rationale order.
#[must_use]
pub fn available_signals() -> Vec<SignalInfo> {
    vec![
        SignalInfo {
            name: "premium_discount",
            kind: SignalKind::PremiumDiscount,
            category: SignalCategory::Valuation,
            description: "Rolling z-score of (price - NAV) / NAV",
            typical_lookback: 126,
            scope: SignalScope::PerTicker,
        },
        SignalInfo {
            name: "volume_liquidity",
            kind: SignalKind::Volume,
            category: SignalCategory::Liquidity,
            description: "Rolling z-scores of volume and (high - low) / close",
            typical_lookback: 60,
            scope: SignalScope::PerTicker,
        },
        SignalInfo {
            name: "divergence",
            kind: SignalKind::Divergence,
            category: SignalCategory::RelativeValue,
            description: "Rolling z-score of the price / benchmark ratio",
            typical_lookback: 126,
            scope: SignalScope::PerTicker,
        },
        SignalInfo {
            name: "cross_asset_stress",
            kind: SignalKind::CrossAsset,
            category: SignalCategory::Macro,
            description: "Count of IG OAS level, IG OAS jump and VIX level stress tests firing",
            typical_lookback: 126,
            scope: SignalScope::Global,
        },
    ]
}

/// Get all signals in a specific category.
#[must_use]
pub fn signals_by_category(category: &SignalCategory) -> Vec<SignalInfo> {
    available_signals()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific signal by name.
#[must_use]
pub fn get_signal_info(name: &str) -> Option<SignalInfo> {
    available_signals()
        .into_iter()
        .find(|info| info.name == name)
}

/// Build the four calculators from a run configuration, in rationale order.
#[must_use]
pub fn build_signals(config: &Config) -> Vec<Box<dyn Signal>> {
    vec![
        Box::new(PremiumDiscount::new(PremiumDiscountConfig::from(config))),
        Box::new(VolumeLiquidity::new(VolumeLiquidityConfig::from(config))),
        Box::new(Divergence::new(DivergenceConfig::from(config))),
        Box::new(CrossAssetStress::new(CrossAssetStressConfig::from(config))),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_signals_cover_every_kind() {
        let kinds: Vec<_> = available_signals().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SignalKind::ALL.to_vec());
    }

    #[test]
    fn test_signals_by_category() {
        assert_eq!(signals_by_category(&SignalCategory::Valuation).len(), 1);
        assert_eq!(signals_by_category(&SignalCategory::Macro).len(), 1);
    }

    #[test]
    fn test_get_signal_info() {
        let info = get_signal_info("cross_asset_stress").unwrap();
        assert_eq!(info.scope, SignalScope::Global);
        assert_eq!(info.typical_lookback, 126);
        assert!(get_signal_info("momentum").is_none());
    }

    #[test]
    fn test_category_descriptions() {
        for info in available_signals() {
            assert!(!info.category.description().is_empty());
        }
    }

    #[test]
    fn test_build_signals_matches_registry() {
        let mut config = Config::default();
        config.windows.volume = 10;
        config.windows.range = 15;
        let signals = build_signals(&config);

        let names: Vec<_> = signals.iter().map(|s| s.name().to_string()).collect();
        let registered: Vec<_> = available_signals()
            .iter()
            .map(|s| s.name.to_string())
            .collect();
        assert_eq!(names, registered);
        assert_eq!(signals[1].lookback(), 15);
        assert_eq!(signals[0].lookback(), 126);
    }

    #[test]
    fn test_typical_lookback_matches_defaults() {
        let signals = build_signals(&Config::default());
        for (signal, info) in signals.iter().zip(available_signals()) {
            assert_eq!(signal.lookback(), info.typical_lookback);
            assert_eq!(signal.kind(), info.kind);
        }
    }
}
