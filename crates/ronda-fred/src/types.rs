//! Data types for FRED API responses.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Response of the `series/observations` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationsResponse {
    /// Start of the observation window.
    #[serde(default)]
    pub observation_start: String,
    /// End of the observation window.
    #[serde(default)]
    pub observation_end: String,
    /// Number of observations in the response.
    #[serde(default)]
    pub count: usize,
    /// Dated observations, oldest first.
    #[serde(default)]
    pub observations: Vec<Observation>,
}

/// One dated value of a FRED series.
///
/// FRED reports values as strings and marks missing days with `"."`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Observation date (YYYY-MM-DD).
    pub date: String,
    /// Value as reported.
    pub value: String,
}

impl Observation {
    /// Parse the date string into a NaiveDate.
    #[must_use]
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    /// Numeric value, or `None` for a missing observation.
    #[must_use]
    pub fn parsed_value(&self) -> Option<f64> {
        self.value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

/// Error body returned by FRED alongside a non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// HTTP-like error code.
    pub error_code: u16,
    /// Human-readable message.
    pub error_message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_observations() {
        let json = r#"{
            "realtime_start": "2024-03-01",
            "realtime_end": "2024-03-01",
            "observation_start": "2024-01-01",
            "observation_end": "9999-12-31",
            "units": "lin",
            "count": 3,
            "observations": [
                {"realtime_start": "2024-03-01", "realtime_end": "2024-03-01", "date": "2024-01-01", "value": "."},
                {"realtime_start": "2024-03-01", "realtime_end": "2024-03-01", "date": "2024-01-02", "value": "1.05"},
                {"realtime_start": "2024-03-01", "realtime_end": "2024-03-01", "date": "2024-01-03", "value": "1.07"}
            ]
        }"#;

        let response: ObservationsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.count, 3);
        assert_eq!(response.observations.len(), 3);

        let missing = &response.observations[0];
        assert_eq!(missing.parsed_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(missing.parsed_value(), None);
        assert_eq!(response.observations[1].parsed_value(), Some(1.05));
    }

    #[test]
    fn test_parse_error_body() {
        let json = r#"{"error_code": 400, "error_message": "Bad Request. The value for variable api_key is not registered."}"#;
        let body: ApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(body.error_code, 400);
        assert!(body.error_message.contains("api_key"));
    }
}
