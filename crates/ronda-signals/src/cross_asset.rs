//! Cross-asset stress overlay from credit spreads and equity volatility.

use ronda_traits::stats::{diff, rolling_zscore};
use ronda_traits::{
    Config, Date, HY_OAS, IG_OAS, MarketInputs, Result, Signal, SignalKind, SignalReport,
    SignalResult, SignalSeries, TimeSeries,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for the cross-asset stress signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossAssetStressConfig {
    /// Rolling z-score window for IG OAS and VIX levels (default: 126)
    pub window: usize,
    /// IG OAS level z threshold (default: 2.0)
    pub stress_z: f64,
    /// VIX level z threshold (default: 2.0)
    pub vix_z: f64,
    /// Day-over-day OAS widening threshold in basis points (default: 15)
    pub oas_jump_bps: f64,
}

impl Default for CrossAssetStressConfig {
    fn default() -> Self {
        Self {
            window: 126,
            stress_z: 2.0,
            vix_z: 2.0,
            oas_jump_bps: 15.0,
        }
    }
}

impl From<&Config> for CrossAssetStressConfig {
    fn from(config: &Config) -> Self {
        Self {
            window: config.windows.stress,
            stress_z: config.thresholds.stress_z,
            vix_z: config.thresholds.vix_z,
            oas_jump_bps: config.thresholds.oas_jump_bps,
        }
    }
}

/// Cross-asset stress signal.
///
/// A market-wide overlay built from three one-sided tests evaluated on the
/// credit table's dates:
///
/// 1. IG OAS level z-score at or above `stress_z`
/// 2. IG OAS day-over-day widening at or above `oas_jump_bps`
/// 3. VIX level z-score at or above `vix_z`
///
/// The number of tests firing on a day is the stress intensity (0-3). OAS is
/// quoted in percent, so one point of change is 100 basis points. VIX is
/// carried onto the credit dates with forward fill.
#[derive(Debug, Clone, Default)]
pub struct CrossAssetStress {
    config: CrossAssetStressConfig,
}

#[derive(Debug)]
struct StressComponents {
    dates: Vec<Date>,
    ig_z: Vec<f64>,
    ig_jump_bps: Vec<f64>,
    hy_jump_bps: Vec<f64>,
    vix_z: Vec<f64>,
    intensity: Vec<f64>,
}

impl CrossAssetStress {
    /// Create a new cross-asset stress signal with the given configuration.
    #[must_use]
    pub const fn new(config: CrossAssetStressConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &CrossAssetStressConfig {
        &self.config
    }

    /// `None` when there is no credit data at all.
    fn compute(&self, inputs: &MarketInputs<'_>) -> Option<StressComponents> {
        let credit = inputs.credit;
        if credit.is_empty() || credit.width() == 0 {
            return None;
        }
        let dates = credit.dates().to_vec();
        let undefined = vec![f64::NAN; dates.len()];

        let ig = credit.column(IG_OAS).unwrap_or(undefined.as_slice());
        let hy = credit.column(HY_OAS).unwrap_or(undefined.as_slice());
        let to_bps = |v: Vec<f64>| v.into_iter().map(|d| d * 100.0).collect::<Vec<_>>();

        let ig_z = rolling_zscore(ig, self.config.window);
        let ig_jump_bps = to_bps(diff(ig));
        let hy_jump_bps = to_bps(diff(hy));
        let vix = inputs.vix.reindex_ffill(&dates);
        let vix_z = rolling_zscore(&vix, self.config.window);

        let hit = |v: f64, threshold: f64| if v >= threshold { 1.0 } else { 0.0 };
        let intensity = (0..dates.len())
            .map(|t| {
                hit(ig_z[t], self.config.stress_z)
                    + hit(ig_jump_bps[t], self.config.oas_jump_bps)
                    + hit(vix_z[t], self.config.vix_z)
            })
            .collect();

        Some(StressComponents {
            dates,
            ig_z,
            ig_jump_bps,
            hy_jump_bps,
            vix_z,
            intensity,
        })
    }
}

impl Signal for CrossAssetStress {
    fn name(&self) -> &str {
        "cross_asset_stress"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::CrossAsset
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn latest(&self, inputs: &MarketInputs<'_>) -> Result<SignalReport> {
        let Some(c) = self.compute(inputs) else {
            let mut result = SignalResult::undecidable(self.kind(), "No Credit Data");
            result.value = Some(0.0);
            return Ok(SignalReport::Global(result));
        };

        let last = |v: &[f64]| v.last().copied().filter(|x| x.is_finite());
        let mut reasons = Vec::new();
        if let Some(bps) = last(&c.ig_jump_bps).filter(|b| *b >= self.config.oas_jump_bps) {
            reasons.push(format!("IG OAS +{bps:.0}bps"));
        }
        if let Some(bps) = last(&c.hy_jump_bps).filter(|b| *b >= self.config.oas_jump_bps) {
            reasons.push(format!("HY OAS +{bps:.0}bps"));
        }
        if let Some(z) = last(&c.ig_z).filter(|z| *z >= self.config.stress_z) {
            reasons.push(format!("IG Stress Z: {z:.2}"));
        }
        if let Some(z) = last(&c.vix_z).filter(|z| *z >= self.config.vix_z) {
            reasons.push(format!("VIX Z: {z:.2}"));
        }

        let intensity = c.intensity.last().copied().unwrap_or(0.0);
        debug!(intensity, "cross-asset stress computed");

        Ok(SignalReport::Global(SignalResult {
            name: self.kind().label().to_string(),
            value: Some(intensity),
            zscore: None,
            triggered: intensity > 0.0,
            details: if reasons.is_empty() {
                "Normal".to_string()
            } else {
                reasons.join(", ")
            },
        }))
    }

    fn series(&self, inputs: &MarketInputs<'_>) -> Result<SignalSeries> {
        let series = match self.compute(inputs) {
            Some(c) => TimeSeries::new(c.dates, c.intensity)?,
            None => TimeSeries::new(
                inputs.vix.dates().to_vec(),
                vec![0.0; inputs.vix.len()],
            )?,
        };
        Ok(SignalSeries::Global(series))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{business_days, matrix, series, wiggle};
    use ronda_traits::{OhlcvPanel, PriceMatrix};

    fn config() -> CrossAssetStressConfig {
        CrossAssetStressConfig {
            window: 20,
            ..CrossAssetStressConfig::default()
        }
    }

    fn report(credit: &PriceMatrix, vix: &TimeSeries) -> (SignalReport, SignalSeries) {
        let ohlcv = OhlcvPanel::default();
        let reference = PriceMatrix::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &reference,
            credit,
            vix,
        };
        let signal = CrossAssetStress::new(config());
        (signal.latest(&inputs).unwrap(), signal.series(&inputs).unwrap())
    }

    #[test]
    fn test_no_credit_data() {
        let dates = business_days(5);
        let vix = series(&dates, vec![15.0; 5]);
        let (latest, stream) = report(&PriceMatrix::default(), &vix);

        let SignalReport::Global(result) = latest else {
            panic!("expected global report");
        };
        assert_eq!(result.details, "No Credit Data");
        assert_eq!(result.value, Some(0.0));
        assert!(!result.triggered);

        let SignalSeries::Global(intensity) = stream else {
            panic!("expected global series");
        };
        assert_eq!(intensity.dates(), dates.as_slice());
        assert!(intensity.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_quiet_market_is_normal() {
        let n = 40;
        let dates = business_days(n);
        let ig: Vec<f64> = (0..n).map(|i| 1.0 + 0.01 * wiggle(i)).collect();
        let hy: Vec<f64> = (0..n).map(|i| 4.0 + 0.01 * wiggle(i + 1)).collect();
        let credit = matrix(&dates, vec![(IG_OAS, ig), (HY_OAS, hy)]);
        let vix = series(&dates, (0..n).map(|i| 15.0 + wiggle(i + 2)).collect());

        let (latest, _) = report(&credit, &vix);
        let SignalReport::Global(result) = latest else {
            panic!("expected global report");
        };
        assert_eq!(result.details, "Normal");
        assert_eq!(result.value, Some(0.0));
        assert!(!result.triggered);
    }

    #[test]
    fn test_oas_blowout_fires_all_three_tests() {
        let n = 40;
        let dates = business_days(n);
        let mut ig: Vec<f64> = (0..n).map(|i| 1.0 + 0.001 * wiggle(i)).collect();
        ig[n - 1] += 0.18;
        let hy: Vec<f64> = (0..n).map(|i| 4.0 + 0.001 * wiggle(i + 1)).collect();
        let mut vix_values: Vec<f64> = (0..n).map(|i| 15.0 + 0.1 * wiggle(i + 2)).collect();
        vix_values[n - 1] = 30.0;

        let credit = matrix(&dates, vec![(IG_OAS, ig), (HY_OAS, hy)]);
        let vix = series(&dates, vix_values);
        let (latest, stream) = report(&credit, &vix);

        let SignalReport::Global(result) = latest else {
            panic!("expected global report");
        };
        assert!(result.triggered);
        assert_eq!(result.value, Some(3.0));
        assert!(result.details.starts_with("IG OAS +18bps"));
        assert!(result.details.contains("IG Stress Z: "));
        assert!(result.details.contains("VIX Z: "));
        assert!(!result.details.contains("HY OAS"));

        let SignalSeries::Global(intensity) = stream else {
            panic!("expected global series");
        };
        assert_eq!(intensity.last().map(|(_, v)| v), Some(3.0));
        assert!(intensity.values()[..n - 1].iter().all(|v| *v < 3.0));
    }

    #[test]
    fn test_vix_forward_filled_onto_credit_dates() {
        let n = 40;
        let dates = business_days(n);
        let ig: Vec<f64> = (0..n).map(|i| 1.0 + 0.001 * wiggle(i)).collect();
        let credit = matrix(&dates, vec![(IG_OAS, ig)]);
        let mut vix_values: Vec<f64> = (0..n - 1).map(|i| 15.0 + 0.1 * wiggle(i)).collect();
        vix_values[n - 2] = 30.0;
        // VIX has no print on the final credit date.
        let vix = series(&dates[..n - 1], vix_values);

        let (latest, _) = report(&credit, &vix);
        let SignalReport::Global(result) = latest else {
            panic!("expected global report");
        };
        assert!(result.details.contains("VIX Z: "));
        assert!(result.triggered);
    }

    #[test]
    fn test_stress_is_one_sided() {
        let n = 40;
        let dates = business_days(n);
        let mut ig: Vec<f64> = (0..n).map(|i| 1.0 + 0.001 * wiggle(i)).collect();
        ig[n - 1] -= 0.30;
        let credit = matrix(&dates, vec![(IG_OAS, ig)]);
        let vix = TimeSeries::default();

        let (latest, _) = report(&credit, &vix);
        let SignalReport::Global(result) = latest else {
            panic!("expected global report");
        };
        assert!(!result.triggered);
        assert_eq!(result.details, "Normal");
    }
}
