//! Data loading utilities for the ronda CLI.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use ronda::data::Universe;
use ronda::fred::FredClient;
use ronda::{Config, MarketSnapshot, PriceMatrix};
use tracing::{info, warn};

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{date_str}', expected YYYY-MM-DD"))
}

/// First date to fetch so that rolling windows are warm by `start`.
pub(crate) fn fetch_start(config: &Config, start: NaiveDate) -> NaiveDate {
    start - Duration::days(config.warmup_calendar_days())
}

/// Credit spreads from FRED, or an empty matrix when they cannot be fetched.
///
/// The cross-asset signal reports "No Credit Data" on an empty matrix, so a
/// missing key or a failed request degrades the run instead of aborting it.
pub(crate) async fn credit_spreads(start: NaiveDate) -> PriceMatrix {
    let client = match FredClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            warn!(error = %e, "FRED client unavailable, running without credit data");
            return PriceMatrix::default();
        }
    };
    match client.credit_spreads(start).await {
        Ok(spreads) => spreads,
        Err(e) => {
            warn!(error = %e, "failed to fetch credit spreads, running without credit data");
            PriceMatrix::default()
        }
    }
}

/// Load the universe and every market input for `[start - warmup, end]`.
pub(crate) async fn load_snapshot(
    config: &Config,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<MarketSnapshot> {
    let universe = Universe::load(&config.universe).context("loading universe")?;
    info!(profile = %config.universe.profile, tickers = universe.len(), "universe selected");

    let fetch_from = fetch_start(config, start);
    let credit = credit_spreads(fetch_from).await;
    let snapshot = MarketSnapshot::load(config, &universe, credit, fetch_from, end)
        .context("loading market data")?;
    Ok(snapshot)
}
