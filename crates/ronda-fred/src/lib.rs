//! FRED (Federal Reserve Economic Data) API client for ronda.
//!
//! This crate fetches the ICE BofA option-adjusted spread series behind the
//! cross-asset stress overlay from the [FRED](https://fred.stlouisfed.org/)
//! API.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ronda_fred::FredClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = FredClient::from_env()?;
//!
//!     // IG_OAS and HY_OAS columns, forward-filled
//!     let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//!     let spreads = client.credit_spreads(start).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Environment Variables
//!
//! Set `FRED_API_KEY` in your environment or `.env` file:
//!
//! ```bash
//! FRED_API_KEY=your_api_key_here
//! ```

mod client;
mod error;
mod types;

pub use client::{FredClient, HY_OAS_SERIES, IG_OAS_SERIES, spreads_matrix};
pub use error::FredError;
pub use types::*;

/// Result type for FRED operations.
pub type Result<T> = std::result::Result<T, FredError>;
