//! Relative divergence of an ETF versus its benchmark.

use std::collections::BTreeMap;

use ronda_traits::{
    Config, MarketInputs, Result, Signal, SignalKind, SignalReport, SignalResult, SignalSeries,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::relative::RelativeMetric;

/// Configuration for the divergence signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceConfig {
    /// Rolling z-score window in observations (default: 126)
    pub window: usize,
    /// |z| at or above which the signal fires (default: 2.0)
    pub threshold_z: f64,
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        Self {
            window: 126,
            threshold_z: 2.0,
        }
    }
}

impl From<&Config> for DivergenceConfig {
    fn from(config: &Config) -> Self {
        Self {
            window: config.windows.divergence,
            threshold_z: config.thresholds.divergence_z,
        }
    }
}

/// Divergence signal.
///
/// Tracks the price ratio `price / benchmark` and flags unusual moves of that
/// ratio with a rolling z-score. A negative z-score means the ETF has lagged
/// its benchmark.
#[derive(Debug, Clone, Default)]
pub struct Divergence {
    config: DivergenceConfig,
}

impl Divergence {
    /// Create a new divergence signal with the given configuration.
    #[must_use]
    pub const fn new(config: DivergenceConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &DivergenceConfig {
        &self.config
    }

    fn compute(&self, inputs: &MarketInputs<'_>) -> RelativeMetric {
        RelativeMetric::compute(inputs, self.config.window, |price, benchmark| {
            price / benchmark
        })
    }
}

impl Signal for Divergence {
    fn name(&self) -> &str {
        "divergence"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::Divergence
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn latest(&self, inputs: &MarketInputs<'_>) -> Result<SignalReport> {
        let computed = self.compute(inputs);
        let mut results = BTreeMap::new();

        for symbol in computed.metric.keys() {
            if computed.unavailable.contains(symbol) {
                results.insert(
                    symbol.clone(),
                    SignalResult::undecidable(self.kind(), "Benchmark data unavailable"),
                );
                continue;
            }

            let (value, zscore) = computed.latest(symbol);
            let details = zscore.map_or_else(
                || "Insufficient data".to_string(),
                |z| format!("Div Z: {z:.2}"),
            );
            results.insert(
                symbol.clone(),
                SignalResult {
                    name: self.kind().label().to_string(),
                    value,
                    zscore,
                    triggered: zscore.is_some_and(|z| z.abs() >= self.config.threshold_z),
                    details,
                },
            );
        }

        debug!(tickers = results.len(), "divergence computed");
        Ok(SignalReport::PerTicker(results))
    }

    fn series(&self, inputs: &MarketInputs<'_>) -> Result<SignalSeries> {
        Ok(SignalSeries::PerTicker(
            self.compute(inputs).into_zscore_matrix()?,
        ))
    }
}
