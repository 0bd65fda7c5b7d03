//! Premium/discount of market price versus NAV.

use std::collections::BTreeMap;

use ronda_traits::{
    Config, MarketInputs, Result, Signal, SignalKind, SignalReport, SignalResult, SignalSeries,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::relative::RelativeMetric;

/// Configuration for the premium/discount signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PremiumDiscountConfig {
    /// Rolling z-score window in observations (default: 126, about six months)
    pub window: usize,
    /// |z| at or above which the signal fires (default: 2.0)
    pub threshold_z: f64,
}

impl Default for PremiumDiscountConfig {
    fn default() -> Self {
        Self {
            window: 126,
            threshold_z: 2.0,
        }
    }
}

impl From<&Config> for PremiumDiscountConfig {
    fn from(config: &Config) -> Self {
        Self {
            window: config.windows.premdisc,
            threshold_z: config.thresholds.premdisc_z,
        }
    }
}

/// Premium/discount signal.
///
/// Measures `(price - nav) / nav` per day and normalizes it with a rolling
/// z-score. A strongly negative z-score is a discount (buy pressure), a
/// strongly positive one a premium.
///
/// When no NAV is published the reference is a benchmark proxy; a ticker
/// without any reference is reported as "NAV data unavailable".
///
/// # Example
///
/// ```ignore
/// use ronda_signals::PremiumDiscount;
///
/// let signal = PremiumDiscount::default();
/// let report = signal.latest(&inputs)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PremiumDiscount {
    config: PremiumDiscountConfig,
}

impl PremiumDiscount {
    /// Create a new premium/discount signal with the given configuration.
    #[must_use]
    pub const fn new(config: PremiumDiscountConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PremiumDiscountConfig {
        &self.config
    }

    fn compute(&self, inputs: &MarketInputs<'_>) -> RelativeMetric {
        RelativeMetric::compute(inputs, self.config.window, |price, nav| {
            (price - nav) / nav
        })
    }
}

fn details(value: Option<f64>, zscore: Option<f64>) -> String {
    match (value, zscore) {
        (Some(v), Some(z)) => format!("Prem/Disc: {:.2}%, Z: {z:.2}", v * 100.0),
        (Some(v), None) => format!("Prem/Disc: {:.2}%, Z: n/a", v * 100.0),
        (None, _) => "Insufficient data".to_string(),
    }
}

impl Signal for PremiumDiscount {
    fn name(&self) -> &str {
        "premium_discount"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::PremiumDiscount
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
                    SignalResult::undecidable(self.kind(), "NAV data unavailable"),
                );
                continue;
            }

            let (value, zscore) = computed.latest(symbol);
            let triggered = zscore.is_some_and(|z| z.abs() >= self.config.threshold_z);
            results.insert(
                symbol.clone(),
                SignalResult {
                    name: self.kind().label().to_string(),
                    value,
                    zscore,
                    triggered,
                    details: details(value, zscore),
                },
            );
        }

        debug!(
            tickers = results.len(),
            fired = results.values().filter(|r| r.triggered).count(),
            "premium/discount computed"
        );
        Ok(SignalReport::PerTicker(results))
    }

    fn series(&self, inputs: &MarketInputs<'_>) -> Result<SignalSeries> {
        Ok(SignalSeries::PerTicker(
            self.compute(inputs).into_zscore_matrix()?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bars, business_days, matrix, panel, wiggle};
    use ronda_traits::{PriceMatrix, TimeSeries};

    fn config() -> PremiumDiscountConfig {
        PremiumDiscountConfig {
            window: 20,
            threshold_z: 2.0,
        }
    }

    #[test]
    fn test_default_config() {
        let config = PremiumDiscountConfig::default();
        assert_eq!(config.window, 126);
        assert_eq!(config.threshold_z, 2.0);
        assert_eq!(PremiumDiscount::default().lookback(), 126);
    }

    #[test]
    fn test_from_engine_config() {
        let mut engine = Config::default();
        engine.windows.premdisc = 60;
        let config = PremiumDiscountConfig::from(&engine);
        assert_eq!(config.window, 60);
    }

    #[test]
    fn test_discount_triggers() {
        let n = 40;
        let dates = business_days(n);
        let navs: Vec<f64> = (0..n).map(|i| 100.0 + wiggle(i)).collect();
        let mut closes: Vec<f64> = navs
            .iter()
            .enumerate()
            .map(|(i, nav)| nav * (1.0 + 0.001 * wiggle(i + 3)))
            .collect();
        closes[n - 1] = navs[n - 1] * 0.95;

        let ohlcv = panel(&dates, vec![("VTI", bars(&closes))]);
        let reference = matrix(&dates, vec![("VTI", navs)]);
        let empty = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &reference,
            credit: &empty,
            vix: &vix,
        };

        let signal = PremiumDiscount::new(config());
        let report = signal.latest(&inputs).unwrap();
        let result = report.for_ticker("VTI").unwrap();

        assert!(result.triggered);
        assert!(result.zscore.unwrap() <= -2.0);
        assert!((result.value.unwrap() + 0.05).abs() < 1e-9);
        assert!(result.details.starts_with("Prem/Disc: -5.00%, Z: -"));

        let SignalSeries::PerTicker(series) = signal.series(&inputs).unwrap() else {
            panic!("expected per-ticker series");
        };
        let last = *series.column("VTI").unwrap().last().unwrap();
        assert!((last - result.zscore.unwrap()).abs() < 1e-12);
    }

    #[test]
    fn test_missing_reference_is_not_an_error() {
        let dates = business_days(30);
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + wiggle(i)).collect();
        let ohlcv = panel(
            &dates,
            vec![("VTI", bars(&closes)), ("BND", bars(&closes))],
        );
        let reference = matrix(&dates, vec![("VTI", closes.clone())]);
        let empty = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &reference,
            credit: &empty,
            vix: &vix,
        };

        let report = PremiumDiscount::new(config()).latest(&inputs).unwrap();
        let bnd = report.for_ticker("BND").unwrap();
        assert_eq!(bnd.zscore, None);
        assert!(!bnd.triggered);
        assert_eq!(bnd.details, "NAV data unavailable");
    }

    #[test]
    fn test_zero_reference_is_undefined() {
        let dates = business_days(25);
        let closes: Vec<f64> = (0..25).map(|i| 50.0 + wiggle(i)).collect();
        let mut navs = closes.clone();
        navs[24] = 0.0;
        let ohlcv = panel(&dates, vec![("VTI", bars(&closes))]);
        let reference = matrix(&dates, vec![("VTI", navs)]);
        let empty = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &reference,
            credit: &empty,
            vix: &vix,
        };

        let result = PremiumDiscount::new(config()).latest(&inputs).unwrap();
        let vti = result.for_ticker("VTI").unwrap();
        assert_eq!(vti.value, None);
        assert_eq!(vti.zscore, None);
        assert_eq!(vti.details, "Insufficient data");
    }

    #[test]
    fn test_short_history_is_undecidable() {
        let dates = business_days(10);
        let closes: Vec<f64> = (0..10).map(|i| 50.0 + wiggle(i)).collect();
        let navs: Vec<f64> = closes.iter().map(|c| c * 1.01).collect();
        let ohlcv = panel(&dates, vec![("VTI", bars(&closes))]);
        let reference = matrix(&dates, vec![("VTI", navs)]);
        let empty = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &reference,
            credit: &empty,
            vix: &vix,
        };

        let report = PremiumDiscount::new(config()).latest(&inputs).unwrap();
        let vti = report.for_ticker("VTI").unwrap();
        assert!(vti.value.is_some());
        assert_eq!(vti.zscore, None);
        assert!(!vti.triggered);
        assert!(vti.details.ends_with("Z: n/a"));
    }

    #[test]
    fn test_reference_aligned_to_common_dates() {
        let dates = business_days(30);
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + wiggle(i)).collect();
        let ohlcv = panel(&dates, vec![("VTI", bars(&closes))]);
        // Reference starts five days later and has one fewer trailing day.
        let ref_dates = &dates[5..29];
        let reference = matrix(ref_dates, vec![("VTI", closes[5..29].to_vec())]);
        let empty = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &reference,
            credit: &empty,
            vix: &vix,
        };

        let SignalSeries::PerTicker(series) =
            PremiumDiscount::new(config()).series(&inputs).unwrap()
        else {
            panic!("expected per-ticker series");
        };
        assert_eq!(series.dates(), ref_dates);
    }
}
