//! FRED API client implementation.

use std::collections::BTreeMap;
use std::env;

use chrono::NaiveDate;
use reqwest::Client;
use ronda_traits::{HY_OAS, IG_OAS, PriceMatrix, TimeSeries};
use tracing::{info, warn};

use crate::{
    Result,
    error::FredError,
    types::{ApiErrorResponse, Observation, ObservationsResponse},
};

/// Base URL for the FRED API.
const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";

/// ICE BofA US Corporate Index option-adjusted spread.
pub const IG_OAS_SERIES: &str = "BAMLC0A0CM";

/// ICE BofA US High Yield Index option-adjusted spread.
pub const HY_OAS_SERIES: &str = "BAMLH0A0HYM2";

/// FRED API client.
#[derive(Debug, Clone)]
pub struct FredClient {
    client: Client,
    api_key: String,
}

impl FredClient {
    /// Create a new FRED client with the given API key.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    /// Create a new FRED client from the `FRED_API_KEY` environment variable.
    ///
    /// This will also load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the environment variable is not set.
    pub fn from_env() -> Result<Self> {
        // Try to load .env file (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_key = env::var("FRED_API_KEY").map_err(|_| FredError::MissingApiKey)?;

        Ok(Self::new(api_key))
    }

    /// Build a URL with the API key and JSON output.
    fn url(&self, endpoint: &str) -> String {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{FRED_BASE_URL}/{endpoint}{separator}api_key={}&file_type=json",
            self.api_key
        )
    }

    /// Make a GET request and parse the JSON response.
    async fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FredError::RateLimitExceeded);
        }

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorResponse>(&text)
                .map_or(text, |body| body.error_message);
            return Err(FredError::Api(format!("HTTP {status}: {message}")));
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Get raw observations of a series.
    ///
    /// # Arguments
    ///
    /// * `series_id` - FRED series id (e.g., "BAMLC0A0CM")
    /// * `start` - First observation date
    /// * `end` - Last observation date, or the latest available
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Vec<Observation>> {
        let mut params = String::new();
        if let Some(s) = start {
            params.push_str(&format!("&observation_start={s}"));
        }
        if let Some(e) = end {
            params.push_str(&format!("&observation_end={e}"));
        }

        let endpoint = format!("series/observations?series_id={series_id}{params}");
        let response: ObservationsResponse = self.get(&endpoint).await?;
        Ok(response.observations)
    }

    /// Get a series with missing observations dropped.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<TimeSeries> {
        let observations = self.observations(series_id, start, end).await?;
        observations_to_series(&observations)
    }

    /// IG and HY option-adjusted spreads from `start`, in percent.
    ///
    /// Returns a matrix with `IG_OAS` and `HY_OAS` columns over the union of
    /// both series' dates, forward-filled. A series that fails to download
    /// is logged and left undefined.
    ///
    /// # Errors
    ///
    /// Returns [`FredError::NoData`] if neither series could be fetched.
    pub async fn credit_spreads(&self, start: NaiveDate) -> Result<PriceMatrix> {
        info!(%start, "fetching credit spreads from FRED");
        let (ig, hy) = tokio::join!(
            self.series(IG_OAS_SERIES, Some(start), None),
            self.series(HY_OAS_SERIES, Some(start), None),
        );

        let ig = ig
            .inspect_err(|e| warn!(series = IG_OAS_SERIES, error = %e, "failed to fetch series"))
            .ok();
        let hy = hy
            .inspect_err(|e| warn!(series = HY_OAS_SERIES, error = %e, "failed to fetch series"))
            .ok();
        if ig.is_none() && hy.is_none() {
            return Err(FredError::NoData("credit spreads".to_string()));
        }

        Ok(spreads_matrix(ig.unwrap_or_default(), hy.unwrap_or_default()))
    }
}

/// Turn observations into a series, dropping missing values.
fn observations_to_series(observations: &[Observation]) -> Result<TimeSeries> {
    let pairs = observations
        .iter()
        .filter_map(|o| Some((o.parsed_date()?, o.parsed_value()?)));
    Ok(TimeSeries::from_pairs(pairs)?)
}

/// Combine the two OAS series into one forward-filled matrix.
///
/// Both columns are always present; a missing series is all `NaN`.
pub fn spreads_matrix(ig: TimeSeries, hy: TimeSeries) -> PriceMatrix {
    let mut series = BTreeMap::new();
    series.insert(IG_OAS.to_string(), ig);
    series.insert(HY_OAS.to_string(), hy);
    PriceMatrix::from_series(series).ffill()
}
