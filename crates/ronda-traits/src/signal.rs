//! Signal trait for detecting pricing dislocations.
//!
//! This module defines the `Signal` trait, the core abstraction shared by the
//! four dislocation calculators, together with the values they produce:
//!
//! - [`SignalResult`]: the latest-day reading for one ticker (or the market)
//! - [`SignalReport`]: latest mode output, per ticker or global
//! - [`SignalSeries`]: series mode output, a full date-indexed stream
//!
//! Both output modes are derived from one shared rolling computation, so the
//! last row of a series always agrees with the latest report.

use std::collections::BTreeMap;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{Date, OhlcvPanel, PriceMatrix, Result, Symbol, TimeSeries};

/// Details string for a ticker whose bars could not be processed.
pub const DATA_ERROR_DETAILS: &str = "Data Error";

/// The four signal families, in rationale order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Price versus NAV (or proxy).
    PremiumDiscount,
    /// Abnormal volume and intraday range.
    Volume,
    /// Price relative to benchmark.
    Divergence,
    /// Credit and volatility stress overlay.
    CrossAsset,
}

impl SignalKind {
    /// Every family in rationale order.
    pub const ALL: [Self; 4] = [
        Self::PremiumDiscount,
        Self::Volume,
        Self::Divergence,
        Self::CrossAsset,
    ];

    /// Short key used in configuration and the `signals_fired` column.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::PremiumDiscount => "premdisc",
            Self::Volume => "volume",
            Self::Divergence => "divergence",
            Self::CrossAsset => "cross_asset",
        }
    }

    /// Display name.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PremiumDiscount => "Premium/Discount",
            Self::Volume => "Volume/Liquidity",
            Self::Divergence => "Divergence",
            Self::CrossAsset => "Cross-Asset Stress",
        }
    }
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// The latest-day reading of one signal.
///
/// `zscore = None` means the reading is undecidable (missing reference,
/// insufficient history, zero variance). Downstream it carries zero weight;
/// it never removes the ticker from the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalResult {
    /// Display name of the signal.
    pub name: String,
    /// Raw metric on the latest day.
    pub value: Option<f64>,
    /// Rolling-window normalized metric on the latest day.
    pub zscore: Option<f64>,
    /// Whether the signal fired.
    pub triggered: bool,
    /// Human-readable description, display only.
    pub details: String,
}

impl SignalResult {
    /// A reading with no usable data.
    pub fn undecidable(kind: SignalKind, details: impl Into<String>) -> Self {
        Self {
            name: kind.label().to_string(),
            value: None,
            zscore: None,
            triggered: false,
            details: details.into(),
        }
    }

    /// A reading for a ticker whose bars were malformed.
    pub fn data_error(kind: SignalKind) -> Self {
        Self::undecidable(kind, DATA_ERROR_DETAILS)
    }

    /// The z-score, with undecidable readings mapped to zero.
    pub fn zscore_or_zero(&self) -> f64 {
        self.zscore.filter(|z| z.is_finite()).unwrap_or(0.0)
    }
}

/// Latest mode output of a signal.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalReport {
    /// One reading per ticker.
    PerTicker(BTreeMap<Symbol, SignalResult>),
    /// One reading that applies to every ticker.
    Global(SignalResult),
}

impl SignalReport {
    /// The reading that applies to `symbol`, if any.
    pub fn for_ticker(&self, symbol: &str) -> Option<&SignalResult> {
        match self {
            Self::PerTicker(results) => results.get(symbol),
            Self::Global(result) => Some(result),
        }
    }
}

/// Series mode output of a signal.
#[derive(Debug, Clone)]
pub enum SignalSeries {
    /// Date × ticker z-scores.
    PerTicker(PriceMatrix),
    /// One value per date applying to every ticker (stress intensity).
    Global(TimeSeries),
}

impl SignalSeries {
    /// Re-index onto `dates` × `symbols`.
    ///
    /// Global streams are broadcast to every column. Dates or tickers the
    /// stream does not cover are `NaN`.
    pub fn to_matrix(&self, dates: &[Date], symbols: &[Symbol]) -> Array2<f64> {
        let mut out = Array2::from_elem((dates.len(), symbols.len()), f64::NAN);
        match self {
            Self::PerTicker(matrix) => {
                let aligned = matrix.reindex(dates);
                for (j, symbol) in symbols.iter().enumerate() {
                    if let Some(values) = aligned.column(symbol) {
                        for (i, v) in values.iter().enumerate() {
                            out[[i, j]] = *v;
                        }
                    }
                }
            }
            Self::Global(series) => {
                let values = series.reindex(dates);
                for (i, v) in values.into_iter().enumerate() {
                    out.row_mut(i).fill(v);
                }
            }
        }
        out
    }
}

/// Everything a calculator may read for one run.
///
/// All inputs are read-only for the duration of a run. Each calculator aligns
/// the pieces it needs itself; alignment between fields is never assumed.
#[derive(Debug, Clone, Copy)]
pub struct MarketInputs<'a> {
    /// OHLCV bars for the universe.
    pub ohlcv: &'a OhlcvPanel,
    /// Fair-value reference per ticker: NAV or the benchmark proxy.
    pub reference: &'a PriceMatrix,
    /// Credit spreads with `IG_OAS` and `HY_OAS` columns, in percent.
    pub credit: &'a PriceMatrix,
    /// Volatility index closes.
    pub vix: &'a TimeSeries,
}

/// A dislocation signal.
///
/// The `Signal` trait defines the interface every calculator implements.
/// Implementations should be thread-safe (`Send + Sync`) so per-ticker work
/// can be spread across threads.
///
/// # Example
///
/// ```no_run
/// use ronda_traits::{MarketInputs, Result, Signal, SignalKind, SignalReport, SignalResult, SignalSeries};
///
/// struct Quiet;
///
/// impl Signal for Quiet {
///     fn name(&self) -> &str {
///         "quiet"
///     }
///
///     fn kind(&self) -> SignalKind {
///         SignalKind::CrossAsset
///     }
///
///     fn lookback(&self) -> usize {
///         1
///     }
///
///     fn latest(&self, _inputs: &MarketInputs<'_>) -> Result<SignalReport> {
///         Ok(SignalReport::Global(SignalResult::undecidable(self.kind(), "Normal")))
///     }
///
///     fn series(&self, inputs: &MarketInputs<'_>) -> Result<SignalSeries> {
///         Ok(SignalSeries::Global(inputs.vix.clone()))
///     }
/// }
/// ```
pub trait Signal: Send + Sync {
    /// Returns the name of this signal.
    ///
    /// Used for identification in logging and the registry.
    fn name(&self) -> &str;

    /// The family this signal belongs to.
    fn kind(&self) -> SignalKind;

    /// Returns the number of observations needed before the first defined value.
    fn lookback(&self) -> usize;

    /// Computes the latest-day reading.
    ///
    /// # Errors
    ///
    /// Returns an error only for failures that affect the whole run. Missing
    /// references and malformed bars for a single ticker are reported in the
    /// ticker's [`SignalResult`] instead.
    fn latest(&self, inputs: &MarketInputs<'_>) -> Result<SignalReport>;

    /// Computes the full date-indexed stream.
    ///
    /// # Errors
    ///
    /// Same contract as [`latest`](Self::latest).
    fn series(&self, inputs: &MarketInputs<'_>) -> Result<SignalSeries>;
}
