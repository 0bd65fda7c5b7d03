//! Fair-value reference per ticker.
//!
//! Official NAV histories are not available from the price store, so each
//! ticker's reference is the close of its configured benchmark proxy. The
//! same reference feeds both the premium/discount and divergence signals.

use std::collections::{BTreeMap, BTreeSet};

use ronda_traits::{Date, PriceMatrix, Result, Symbol};
use tracing::{info, warn};

use crate::store::PriceStore;

/// Builds reference price matrices from benchmark closes.
#[derive(Debug, Clone, Copy)]
pub struct BenchmarkProvider<'a> {
    store: &'a PriceStore,
}

impl<'a> BenchmarkProvider<'a> {
    /// Create a provider reading from `store`.
    pub const fn new(store: &'a PriceStore) -> Self {
        Self { store }
    }

    /// Reference closes for `tickers`, one column per ticker.
    ///
    /// A ticker whose benchmark is unmapped or has no data gets an all-`NaN`
    /// column; every requested ticker is present in the result.
    ///
    /// # Errors
    ///
    /// Returns an error if a benchmark file exists but cannot be read.
    pub fn benchmark_or_proxy(
        &self,
        tickers: &[Symbol],
        benchmark_map: &BTreeMap<Symbol, Symbol>,
        start: Date,
        end: Date,
    ) -> Result<PriceMatrix> {
        let benchmarks: Vec<Symbol> = tickers
            .iter()
            .filter_map(|t| benchmark_map.get(t))
            .filter(|b| !b.is_empty())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let closes = if benchmarks.is_empty() {
            warn!("no benchmarks defined, reference data will be empty");
            PriceMatrix::default()
        } else {
            info!(benchmarks = ?benchmarks, "fetching benchmark data for proxies");
            self.store.closes(&benchmarks, start, end)?
        };

        let mut reference = PriceMatrix::new(closes.dates().to_vec(), BTreeMap::new())?;
        for ticker in tickers {
            let column = benchmark_map
                .get(ticker)
                .and_then(|benchmark| closes.column(benchmark));
            match column {
                Some(values) => reference.insert_column(ticker.clone(), values.to_vec())?,
                None => {
                    if let Some(benchmark) = benchmark_map.get(ticker) {
                        warn!(ticker = %ticker, benchmark = %benchmark, "no close data for benchmark");
                    }
                    reference.insert_undefined(ticker.clone());
                }
            }
        }
        Ok(reference)
    }
}
