//! Volume and liquidity stress.

use std::collections::BTreeMap;

use ronda_traits::stats::rolling_zscore;
use ronda_traits::{
    Config, MarketInputs, OhlcvColumns, PriceMatrix, Result, RondaError, Signal, SignalKind,
    SignalReport, SignalResult, SignalSeries,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Configuration for the volume/liquidity signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeLiquidityConfig {
    /// Volume z-score window (default: 20 days)
    pub volume_window: usize,
    /// Intraday range z-score window (default: 60 days)
    pub range_window: usize,
    /// Volume |z| threshold (default: 2.0)
    pub volume_threshold_z: f64,
    /// Range |z| threshold (default: 2.0)
    pub range_threshold_z: f64,
}

impl Default for VolumeLiquidityConfig {
    fn default() -> Self {
        Self {
            volume_window: 20,
            range_window: 60,
            volume_threshold_z: 2.0,
            range_threshold_z: 2.0,
        }
    }
}

impl From<&Config> for VolumeLiquidityConfig {
    fn from(config: &Config) -> Self {
        Self {
            volume_window: config.windows.volume,
            range_window: config.windows.range,
            volume_threshold_z: config.thresholds.volume_z,
            range_threshold_z: config.thresholds.range_z,
        }
    }
}

/// Volume/liquidity signal.
///
/// Two readings per ticker: the rolling z-score of traded volume, and the
/// rolling z-score of the intraday range proxy `(high - low) / close`.
/// Either one crossing its threshold fires the signal. The volume z-score is
/// the one that feeds the composite score and the series stream.
#[derive(Debug, Clone, Default)]
pub struct VolumeLiquidity {
    config: VolumeLiquidityConfig,
}

#[derive(Debug)]
struct TickerStress {
    volume: Vec<f64>,
    volume_z: Vec<f64>,
    range_z: Vec<f64>,
}

impl VolumeLiquidity {
    /// Create a new volume/liquidity signal with the given configuration.
    #[must_use]
    pub const fn new(config: VolumeLiquidityConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &VolumeLiquidityConfig {
        &self.config
    }

    fn compute_ticker(&self, symbol: &str, bars: &OhlcvColumns) -> Result<TickerStress> {
        validate_bars(symbol, bars)?;

        let range: Vec<f64> = bars
            .high
            .iter()
            .zip(&bars.low)
            .zip(&bars.close)
            .map(|((&h, &l), &c)| {
                if c.is_finite() && c != 0.0 {
                    (h - l) / c
                } else {
                    f64::NAN
                }
            })
            .collect();

        Ok(TickerStress {
            volume_z: rolling_zscore(&bars.volume, self.config.volume_window),
            range_z: rolling_zscore(&range, self.config.range_window),
            volume: bars.volume.clone(),
        })
    }

    fn result(&self, stress: &TickerStress) -> SignalResult {
        let last = |v: &[f64]| v.last().copied().filter(|x| x.is_finite());
        let volume_z = last(&stress.volume_z);
        let range_z = last(&stress.range_z);

        let mut fired = Vec::new();
        if let Some(z) = volume_z.filter(|z| z.abs() >= self.config.volume_threshold_z) {
            fired.push(format!("Vol Z: {z:.2}"));
        }
        if let Some(z) = range_z.filter(|z| z.abs() >= self.config.range_threshold_z) {
            fired.push(format!("Range Z: {z:.2}"));
        }

        let details = if !fired.is_empty() {
            fired.join(", ")
        } else if volume_z.is_none() && range_z.is_none() {
            "Insufficient data".to_string()
        } else {
            "Normal".to_string()
        };

        SignalResult {
            name: self.kind().label().to_string(),
            value: last(&stress.volume),
            zscore: volume_z,
            triggered: !fired.is_empty(),
            details,
        }
    }
}

/// Reject bars that cannot describe a real session.
fn validate_bars(symbol: &str, bars: &OhlcvColumns) -> Result<()> {
    for (i, ((&h, &l), &v)) in bars.high.iter().zip(&bars.low).zip(&bars.volume).enumerate() {
        if h.is_finite() && l.is_finite() && h < l {
            return Err(RondaError::InvalidData(format!(
                "{symbol}: high {h} below low {l} at bar {i}"
            )));
        }
        if v.is_finite() && v < 0.0 {
            return Err(RondaError::InvalidData(format!(
                "{symbol}: negative volume {v} at bar {i}"
            )));
        }
    }
    Ok(())
}

impl Signal for VolumeLiquidity {
    fn name(&self) -> &str {
        "volume_liquidity"
    }

    fn kind(&self) -> SignalKind {
        SignalKind::Volume
    }

    fn lookback(&self) -> usize {
        self.config.volume_window.max(self.config.range_window)
    }

    fn latest(&self, inputs: &MarketInputs<'_>) -> Result<SignalReport> {
        let mut results = BTreeMap::new();
        for (symbol, bars) in inputs.ohlcv.iter() {
            let result = match self.compute_ticker(symbol, bars) {
                Ok(stress) => self.result(&stress),
                Err(e) => {
                    warn!(%symbol, error = %e, "volume signal data error");
                    SignalResult::data_error(self.kind())
                }
            };
            results.insert(symbol.clone(), result);
        }
        debug!(tickers = results.len(), "volume/liquidity computed");
        Ok(SignalReport::PerTicker(results))
    }

    fn series(&self, inputs: &MarketInputs<'_>) -> Result<SignalSeries> {
        let dates = inputs.ohlcv.dates().to_vec();
        let mut columns = BTreeMap::new();
        for (symbol, bars) in inputs.ohlcv.iter() {
            let values = match self.compute_ticker(symbol, bars) {
                Ok(stress) => stress.volume_z,
                Err(e) => {
                    warn!(%symbol, error = %e, "volume signal data error");
                    vec![f64::NAN; dates.len()]
                }
            };
            columns.insert(symbol.clone(), values);
        }
        Ok(SignalSeries::PerTicker(PriceMatrix::new(dates, columns)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{bars, business_days, panel, wiggle};
    use ronda_traits::TimeSeries;

    fn config() -> VolumeLiquidityConfig {
        VolumeLiquidityConfig {
            volume_window: 20,
            range_window: 30,
            volume_threshold_z: 2.0,
            range_threshold_z: 2.0,
        }
    }

    fn run(ohlcv: &ronda_traits::OhlcvPanel) -> SignalReport {
        let empty = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv,
            reference: &empty,
            credit: &empty,
            vix: &vix,
        };
        VolumeLiquidity::new(config()).latest(&inputs).unwrap()
    }

    #[test]
    fn test_default_lookback_is_longest_window() {
        assert_eq!(VolumeLiquidity::default().lookback(), 60);
    }

    #[test]
    fn test_volume_spike_triggers() {
        let n = 40;
        let dates = business_days(n);
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + wiggle(i)).collect();
        let mut spiky = bars(&closes);
        spiky.volume[n - 1] = 5_000_000.0;

        let report = run(&panel(&dates, vec![("VTI", spiky)]));
        let result = report.for_ticker("VTI").unwrap();
        assert!(result.triggered);
        assert!(result.zscore.unwrap() >= 2.0);
        assert_eq!(result.value, Some(5_000_000.0));
        assert!(result.details.starts_with("Vol Z: "));
    }

    #[test]
    fn test_range_spike_triggers_without_moving_zscore() {
        let n = 40;
        let dates = business_days(n);
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + wiggle(i)).collect();
        let mut wide = bars(&closes);
        // Vary the range slightly so the window has variance, then blow it out.
        for i in 0..n {
            wide.high[i] = closes[i] * (1.01 + 0.001 * wiggle(i + 5));
        }
        wide.high[n - 1] = closes[n - 1] * 1.10;
        wide.low[n - 1] = closes[n - 1] * 0.90;

        let report = run(&panel(&dates, vec![("VTI", wide)]));
        let result = report.for_ticker("VTI").unwrap();
        assert!(result.triggered);
        assert!(result.details.contains("Range Z: "));
        assert!(result.zscore.unwrap().abs() < 2.0);
    }

    #[test]
    fn test_quiet_ticker_is_normal() {
        let n = 40;
        let dates = business_days(n);
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + wiggle(i)).collect();
        let report = run(&panel(&dates, vec![("VTI", bars(&closes))]));
        let result = report.for_ticker("VTI").unwrap();
        assert!(!result.triggered);
        assert_eq!(result.details, "Normal");
    }

    #[test]
    fn test_malformed_bars_isolated_to_ticker() {
        let n = 40;
        let dates = business_days(n);
        let closes: Vec<f64> = (0..n).map(|i| 100.0 + wiggle(i)).collect();
        let mut broken = bars(&closes);
        broken.high[10] = broken.low[10] - 1.0;

        let ohlcv = panel(
            &dates,
            vec![("BAD", broken), ("VTI", bars(&closes))],
        );
        let report = run(&ohlcv);
        let bad = report.for_ticker("BAD").unwrap();
        assert_eq!(bad.details, "Data Error");
        assert_eq!(bad.zscore, None);
        assert_eq!(report.for_ticker("VTI").unwrap().details, "Normal");

        let empty = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &empty,
            credit: &empty,
            vix: &vix,
        };
        let SignalSeries::PerTicker(series) =
            VolumeLiquidity::new(config()).series(&inputs).unwrap()
        else {
            panic!("expected per-ticker series");
        };
        assert!(series.column("BAD").unwrap().iter().all(|v| v.is_nan()));
        assert!(series.column("VTI").unwrap()[n - 1].is_finite());
    }
}
