//! Shared computation for signals that compare closes against a reference.

use std::collections::{BTreeMap, BTreeSet};

use ronda_traits::stats::rolling_zscore;
use ronda_traits::{Date, MarketInputs, PriceMatrix, Result, Symbol};

/// Raw metric and z-scores for every ticker, on the common date index of
/// closes and reference.
#[derive(Debug)]
pub(crate) struct RelativeMetric {
    pub(crate) dates: Vec<Date>,
    pub(crate) metric: BTreeMap<Symbol, Vec<f64>>,
    pub(crate) zscores: BTreeMap<Symbol, Vec<f64>>,
    /// Tickers with no reference column, or an undefined latest reference.
    pub(crate) unavailable: BTreeSet<Symbol>,
}

impl RelativeMetric {
    /// Align closes with the reference and compute `metric(price, reference)`
    /// per day, then its rolling z-score.
    ///
    /// The metric is undefined where either input is undefined or the
    /// reference is zero.
    pub(crate) fn compute(
        inputs: &MarketInputs<'_>,
        window: usize,
        metric: impl Fn(f64, f64) -> f64,
    ) -> Self {
        let closes = inputs.ohlcv.closes();
        let (prices, reference) = closes.align(inputs.reference);
        let dates = prices.dates().to_vec();

        let mut out = Self {
            dates,
            metric: BTreeMap::new(),
            zscores: BTreeMap::new(),
            unavailable: BTreeSet::new(),
        };

        for (symbol, price) in prices.iter() {
            let Some(refs) = reference.column(symbol) else {
                out.unavailable.insert(symbol.clone());
                out.metric.insert(symbol.clone(), vec![f64::NAN; price.len()]);
                out.zscores.insert(symbol.clone(), vec![f64::NAN; price.len()]);
                continue;
            };
            if !refs.last().is_some_and(|r| r.is_finite()) {
                out.unavailable.insert(symbol.clone());
            }

            let values: Vec<f64> = price
                .iter()
                .zip(refs)
                .map(|(&p, &r)| {
                    if p.is_finite() && r.is_finite() && r != 0.0 {
                        metric(p, r)
                    } else {
                        f64::NAN
                    }
                })
                .collect();
            out.zscores
                .insert(symbol.clone(), rolling_zscore(&values, window));
            out.metric.insert(symbol.clone(), values);
        }

        out
    }

    /// Latest (metric, z-score) for a ticker, each `None` when undefined.
    pub(crate) fn latest(&self, symbol: &str) -> (Option<f64>, Option<f64>) {
        let last = |m: &BTreeMap<Symbol, Vec<f64>>| {
            m.get(symbol)
                .and_then(|v| v.last().copied())
                .filter(|v| v.is_finite())
        };
        (last(&self.metric), last(&self.zscores))
    }

    /// The z-score stream as a price matrix.
    pub(crate) fn into_zscore_matrix(self) -> Result<PriceMatrix> {
        PriceMatrix::new(self.dates, self.zscores)
    }
}
