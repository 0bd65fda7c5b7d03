//! One run's market inputs, loaded from the data collaborators.

use ronda_data::{BenchmarkProvider, PriceStore, Universe};
use ronda_traits::{
    Config, Date, MarketInputs, OhlcvPanel, PriceMatrix, Result, RondaError, TimeSeries,
};
use tracing::info;

/// Owned inputs for a monitor or backtest run.
///
/// Credit spreads come from an async client, so the caller fetches them and
/// hands them in; everything else is read from the price store.
#[derive(Debug, Clone, Default)]
pub struct MarketSnapshot {
    /// OHLCV bars of the universe.
    pub ohlcv: OhlcvPanel,
    /// Benchmark-proxy reference per ticker.
    pub reference: PriceMatrix,
    /// `IG_OAS` and `HY_OAS` columns.
    pub credit: PriceMatrix,
    /// Volatility index closes.
    pub vix: TimeSeries,
}

impl MarketSnapshot {
    /// Load prices, references and the volatility index for `[start, end]`.
    ///
    /// Credit rows after `end` are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::NoData`] when no ticker of the universe has
    /// prices in the window, and propagates read errors.
    pub fn load(
        config: &Config,
        universe: &Universe,
        credit: PriceMatrix,
        start: Date,
        end: Date,
    ) -> Result<Self> {
        let store = PriceStore::new(&config.data.cache_dir);
        let data = store.fetch_ohlcv(universe.tickers(), start, end)?;
        if data.is_empty() {
            return Err(RondaError::NoData(format!(
                "no price data for the universe between {start} and {end}"
            )));
        }
        let ohlcv = data.to_panel()?;

        let reference = BenchmarkProvider::new(&store).benchmark_or_proxy(
            universe.tickers(),
            &universe.benchmark_map(),
            start,
            end,
        )?;
        let vix = store.fetch_series(&config.data.vix_symbol, start, end)?;

        let credit_dates: Vec<Date> = credit
            .dates()
            .iter()
            .copied()
            .filter(|d| *d <= end)
            .collect();
        let credit = credit.reindex(&credit_dates);

        info!(
            tickers = ohlcv.symbols().count(),
            days = ohlcv.dates().len(),
            vix_days = vix.len(),
            credit_days = credit.dates().len(),
            "market snapshot loaded"
        );
        Ok(Self {
            ohlcv,
            reference,
            credit,
            vix,
        })
    }

    /// Borrow the snapshot as calculator inputs.
    pub const fn inputs(&self) -> MarketInputs<'_> {
        MarketInputs {
            ohlcv: &self.ohlcv,
            reference: &self.reference,
            credit: &self.credit,
            vix: &self.vix,
        }
    }
}
