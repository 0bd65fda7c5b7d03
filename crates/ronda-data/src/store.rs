//! CSV price store.
//!
//! Layout: `{cache_dir}/{TICKER}.csv`, one file per ticker with a header
//! row carrying `date`, `open`, `high`, `low`, `close` and `volume` columns
//! (case-insensitive). Index tickers are sanitized for the file system:
//! `^VIX` lives in `hat_VIX.csv`.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use ronda_traits::types::date_to_days;
use ronda_traits::{Date, MarketData, PriceMatrix, Result, RondaError, Symbol, TimeSeries};
use tracing::{debug, info, warn};

/// Price columns every cached file must provide.
const BAR_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

/// File-backed OHLCV store.
#[derive(Debug, Clone)]
pub struct PriceStore {
    cache_dir: PathBuf,
}

impl PriceStore {
    /// Create a store rooted at `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    /// Root directory of the store.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of a ticker's file.
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.csv", file_stem(ticker)))
    }

    /// Bars of one ticker within `[start, end]` in the long
    /// [`MarketData`] layout, or `None` when the ticker has no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or lacks a required column.
    pub fn read_bars(&self, ticker: &str, start: Date, end: Date) -> Result<Option<DataFrame>> {
        let path = self.path_for(ticker);
        if !path.exists() {
            return Ok(None);
        }

        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .map_parse_options(|opts| opts.with_try_parse_dates(true))
            .try_into_reader_with_file_path(Some(path.clone()))?
            .finish()?;
        normalize_headers(&mut df)?;

        for name in std::iter::once("date").chain(BAR_COLUMNS) {
            if !df.get_column_names().iter().any(|c| c.as_str() == name) {
                return Err(RondaError::MissingColumn(format!(
                    "{name} in {}",
                    path.display()
                )));
            }
        }

        let days = col("date").cast(DataType::Date).cast(DataType::Int32);
        let mut columns = vec![
            lit(ticker.to_string()).alias("symbol"),
            col("date").cast(DataType::Date),
        ];
        columns.extend(BAR_COLUMNS.map(|name| col(name).cast(DataType::Float64)));

        let bars = df
            .lazy()
            .filter(
                days.clone()
                    .gt_eq(lit(date_to_days(start)))
                    .and(days.lt_eq(lit(date_to_days(end)))),
            )
            .select(columns)
            .sort(["date"], SortMultipleOptions::default())
            .collect()?;

        debug!(ticker, rows = bars.height(), "read cached bars");
        Ok(Some(bars))
    }

    /// OHLCV bars for `tickers` within `[start, end]`.
    ///
    /// Tickers without a file are skipped with a warning; when none has data
    /// the result is empty rather than an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub fn fetch_ohlcv(&self, tickers: &[Symbol], start: Date, end: Date) -> Result<MarketData> {
        info!(tickers = tickers.len(), %start, %end, "loading OHLCV");
        let mut combined: Option<DataFrame> = None;
        for ticker in tickers {
            let Some(bars) = self.read_bars(ticker, start, end)? else {
                warn!(ticker = %ticker, path = %self.path_for(ticker).display(), "no cached data");
                continue;
            };
            match combined.as_mut() {
                Some(df) => {
                    df.vstack_mut(&bars)?;
                }
                None => combined = Some(bars),
            }
        }
        Ok(MarketData::new(combined.unwrap_or_default()))
    }

    /// Close prices of `tickers` as a date-indexed matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read.
    pub fn closes(&self, tickers: &[Symbol], start: Date, end: Date) -> Result<PriceMatrix> {
        Ok(self.fetch_ohlcv(tickers, start, end)?.to_panel()?.closes())
    }

    /// Close prices of a single ticker, e.g. a volatility index.
    ///
    /// Empty when the ticker has no file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn fetch_series(&self, ticker: &str, start: Date, end: Date) -> Result<TimeSeries> {
        let Some(bars) = self.read_bars(ticker, start, end)? else {
            warn!(ticker, "no cached data");
            return Ok(TimeSeries::default());
        };
        let panel = MarketData::new(bars).to_panel()?;
        Ok(panel
            .closes()
            .series(ticker)
            .unwrap_or_default())
    }

    /// Write a ticker's bars, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_bars(&self, ticker: &str, bars: &mut DataFrame) -> Result<PathBuf> {
        fs::create_dir_all(&self.cache_dir)?;
        let path = self.path_for(ticker);
        let mut file = File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(bars)?;
        Ok(path)
    }
}

/// File-system safe name for a ticker.
fn file_stem(ticker: &str) -> String {
    ticker.replace('^', "hat_").replace('=', "_eq_")
}

/// Trim and lower-case every column name.
pub(crate) fn normalize_headers(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    df.set_column_names(names)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::scratch_dir;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn bars(closes: &[f64]) -> DataFrame {
        let dates: Vec<Date> = (0..closes.len()).map(|i| d(2 + i as u32)).collect();
        df! {
            "Date" => dates,
            "Open" => closes,
            "High" => closes.iter().map(|c| c + 1.0).collect::<Vec<_>>(),
            "Low" => closes.iter().map(|c| c - 1.0).collect::<Vec<_>>(),
            "Close" => closes,
            "Volume" => vec![1_000i64; closes.len()],
        }
        .unwrap()
    }

    #[test]
    fn test_file_stem_sanitizes_index_tickers() {
        assert_eq!(file_stem("^VIX"), "hat_VIX");
        assert_eq!(file_stem("EURUSD=X"), "EURUSD_eq_X");
        assert_eq!(file_stem("VTI"), "VTI");
    }

    #[test]
    fn test_round_trip_and_date_filter() {
        let dir = scratch_dir("store-round-trip");
        let store = PriceStore::new(&dir);
        store
            .write_bars("VTI", &mut bars(&[100.0, 101.0, 102.0, 103.0]))
            .unwrap();

        let df = store.read_bars("VTI", d(3), d(4)).unwrap().unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(
            df.get_column_names_str(),
            ["symbol", "date", "open", "high", "low", "close", "volume"]
        );

        let series = store.fetch_series("VTI", d(1), d(31)).unwrap();
        assert_eq!(series.dates()[0], d(2));
        assert_eq!(series.values(), &[100.0, 101.0, 102.0, 103.0]);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_fetch_ohlcv_skips_missing_tickers() {
        let dir = scratch_dir("store-missing");
        let store = PriceStore::new(&dir);
        store.write_bars("BND", &mut bars(&[70.0, 70.5])).unwrap();
        store.write_bars("^VIX", &mut bars(&[13.0, 14.0])).unwrap();

        let tickers = vec!["BND".to_string(), "VXUS".to_string(), "^VIX".to_string()];
        let data = store.fetch_ohlcv(&tickers, d(1), d(31)).unwrap();
        assert_eq!(data.symbols().unwrap(), vec!["BND".to_string(), "^VIX".to_string()]);
        assert_eq!(data.len(), 4);

        let closes = store.closes(&tickers, d(1), d(31)).unwrap();
        assert_eq!(closes.column("^VIX").unwrap(), &[13.0, 14.0]);

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_nothing_cached_is_empty_not_error() {
        let store = PriceStore::new(scratch_dir("store-empty"));
        let data = store.fetch_ohlcv(&["VTI".to_string()], d(1), d(31)).unwrap();
        assert!(data.is_empty());
        assert!(store.fetch_series("^VIX", d(1), d(31)).unwrap().is_empty());
    }

    #[test]
    fn test_missing_column_is_reported() {
        let dir = scratch_dir("store-bad-file");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("VTI.csv"), "date,close\n2024-01-02,100.0\n").unwrap();

        let err = PriceStore::new(&dir)
            .read_bars("VTI", d(1), d(31))
            .unwrap_err();
        assert!(matches!(err, RondaError::MissingColumn(_)));

        let _ = fs::remove_dir_all(dir);
    }
}
