//! Common types used throughout the Ronda engine.
//!
//! This module defines the core data types for representing market data:
//! the long-format [`MarketData`] frame handed over by data providers, and
//! the date-indexed tables the signal calculators work on ([`TimeSeries`],
//! [`PriceMatrix`], [`OhlcvPanel`] and [`DatedMatrix`]).
//!
//! Undefined entries (missing bars, missing references, insufficient
//! history) are represented as `NaN` inside the tables.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Datelike;
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;

use crate::{Result, RondaError};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A market symbol identifier, e.g. "VTI" or "^VIX".
pub type Symbol = String;

/// Offset between the common era and the Unix epoch, in days.
///
/// Polars stores `Date` values as days since 1970-01-01.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Credit table column with the investment-grade option-adjusted spread, in percent.
pub const IG_OAS: &str = "IG_OAS";

/// Credit table column with the high-yield option-adjusted spread, in percent.
pub const HY_OAS: &str = "HY_OAS";

/// Columns a [`MarketData`] frame must carry to be converted into an [`OhlcvPanel`].
pub const MARKET_DATA_COLUMNS: [&str; 7] =
    ["symbol", "date", "open", "high", "low", "close", "volume"];

/// Convert a polars day count into a date.
pub fn days_to_date(days: i32) -> Option<Date> {
    Date::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS)
}

/// Convert a date into a polars day count.
pub fn date_to_days(date: Date) -> i32 {
    date.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS
}

fn ensure_ascending(dates: &[Date]) -> Result<()> {
    if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
        return Err(RondaError::InvalidData(format!(
            "dates must be strictly ascending: {} followed by {}",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Dates present in both sorted slices.
pub fn intersect_dates(a: &[Date], b: &[Date]) -> Vec<Date> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn positions(source: &[Date], targets: &[Date]) -> Vec<Option<usize>> {
    targets
        .iter()
        .map(|d| source.binary_search(d).ok())
        .collect()
}

fn take(values: &[f64], positions: &[Option<usize>]) -> Vec<f64> {
    positions
        .iter()
        .map(|p| p.map_or(f64::NAN, |i| values[i]))
        .collect()
}

/// Container for market data.
///
/// `MarketData` wraps a long-format Polars DataFrame with one row per
/// (symbol, date) bar. This is the shape data providers hand over; the
/// engine converts it to an [`OhlcvPanel`] before computing signals.
///
/// # Expected Schema
///
/// - `symbol`: Security identifier
/// - `date`: Trading date
/// - `open`, `high`, `low`, `close`: Price data
/// - `volume`: Trading volume
///
/// # Example
///
/// ```no_run
/// use ronda_traits::MarketData;
/// use polars::prelude::*;
///
/// let df = df! {
///     "symbol" => &["VTI", "VXUS"],
///     "close" => &[250.0, 60.0],
///     "volume" => &[1000000, 2000000],
/// }.unwrap();
///
/// let market_data = MarketData::new(df);
/// ```
#[derive(Debug, Clone)]
pub struct MarketData {
    /// The underlying DataFrame containing market data.
    data: DataFrame,
}

impl MarketData {
    /// Creates a new `MarketData` instance from a DataFrame.
    pub const fn new(data: DataFrame) -> Self {
        Self { data }
    }

    /// Returns a reference to the underlying DataFrame.
    pub const fn data(&self) -> &DataFrame {
        &self.data
    }

    /// Returns the number of rows in the market data.
    pub fn len(&self) -> usize {
        self.data.height()
    }

    /// Returns whether the market data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.height() == 0
    }

    /// Returns the column names in the market data.
    pub fn columns(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Checks if a column exists in the market data.
    pub fn has_column(&self, name: &str) -> bool {
        self.data
            .get_column_names()
            .iter()
            .any(|s| s.as_str() == name)
    }

    /// Gets a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.data.column(name).ok()
    }

    /// Unique symbols in the frame, sorted.
    pub fn symbols(&self) -> Result<Vec<Symbol>> {
        if !self.has_column("symbol") {
            return Err(RondaError::MissingColumn("symbol".to_string()));
        }
        let symbols: BTreeSet<Symbol> = self
            .data
            .column("symbol")?
            .as_materialized_series()
            .str()?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(symbols.into_iter().collect())
    }

    /// Pivot the long frame into a date-indexed OHLCV panel.
    ///
    /// The panel's date index is the union of every symbol's dates; a symbol
    /// without a bar on some date gets `NaN` in every field for that date.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing, a row has no symbol
    /// or date, or a (symbol, date) pair appears twice.
    pub fn to_panel(&self) -> Result<OhlcvPanel> {
        if self.is_empty() {
            return Ok(OhlcvPanel::default());
        }
        for col in MARKET_DATA_COLUMNS {
            if !self.has_column(col) {
                return Err(RondaError::MissingColumn(col.to_string()));
            }
        }

        let symbol_col = self.data.column("symbol")?;
        let symbols = symbol_col.as_materialized_series().str()?;
        let dates = date_column(&self.data, "date")?;
        let open = f64_column(&self.data, "open")?;
        let high = f64_column(&self.data, "high")?;
        let low = f64_column(&self.data, "low")?;
        let close = f64_column(&self.data, "close")?;
        let volume = f64_column(&self.data, "volume")?;

        let mut rows: BTreeMap<Symbol, BTreeMap<Date, [f64; 5]>> = BTreeMap::new();
        let mut all_dates = BTreeSet::new();

        for (i, (symbol, date)) in symbols.into_iter().zip(dates.iter()).enumerate() {
            let symbol = symbol
                .ok_or_else(|| RondaError::InvalidData(format!("row {i} has no symbol")))?;
            let date =
                date.ok_or_else(|| RondaError::InvalidData(format!("row {i} has no date")))?;
            let bar = [open[i], high[i], low[i], close[i], volume[i]];
            if rows
                .entry(symbol.to_string())
                .or_default()
                .insert(date, bar)
                .is_some()
            {
                return Err(RondaError::InvalidData(format!(
                    "duplicate bar for {symbol} on {date}"
                )));
            }
            all_dates.insert(date);
        }

        let dates: Vec<Date> = all_dates.into_iter().collect();
        let bars = rows
            .into_iter()
            .map(|(symbol, by_date)| {
                let mut columns = OhlcvColumns::with_capacity(dates.len());
                for date in &dates {
                    let bar = by_date.get(date).copied().unwrap_or([f64::NAN; 5]);
                    columns.push(bar);
                }
                (symbol, columns)
            })
            .collect();

        OhlcvPanel::new(dates, bars)
    }
}

fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

fn date_column(df: &DataFrame, name: &str) -> Result<Vec<Option<Date>>> {
    let series = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Date)?
        .cast(&DataType::Int32)?;
    Ok(series
        .i32()?
        .into_iter()
        .map(|d: Option<i32>| d.and_then(days_to_date))
        .collect())
}

impl From<DataFrame> for MarketData {
    fn from(data: DataFrame) -> Self {
        Self::new(data)
    }
}

impl AsRef<DataFrame> for MarketData {
    fn as_ref(&self) -> &DataFrame {
        &self.data
    }
}

/// An ordered (date, value) series, e.g. a volatility index or one OAS series.
///
/// Dates are strictly ascending; the constructor rejects anything else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    dates: Vec<Date>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Build a series from parallel date and value vectors.
    ///
    /// # Errors
    ///
    /// Returns an error if the lengths differ or the dates are not strictly ascending.
    pub fn new(dates: Vec<Date>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(RondaError::InvalidData(format!(
                "series has {} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        ensure_ascending(&dates)?;
        Ok(Self { dates, values })
    }

    /// Build a series from (date, value) pairs in ascending date order.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Date, f64)>) -> Result<Self> {
        let (dates, values) = pairs.into_iter().unzip();
        Self::new(dates, values)
    }

    /// The date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// The values, parallel to [`dates`](Self::dates).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The final observation.
    pub fn last(&self) -> Option<(Date, f64)> {
        self.dates.last().copied().zip(self.values.last().copied())
    }

    /// Value on an exact date.
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates.binary_search(&date).ok().map(|i| self.values[i])
    }

    /// Values on `dates`, `NaN` where this series has no observation.
    pub fn reindex(&self, dates: &[Date]) -> Vec<f64> {
        take(&self.values, &positions(&self.dates, dates))
    }

    /// Values on `dates`, carrying the last finite observation forward.
    ///
    /// Dates before the first finite observation are `NaN`.
    pub fn reindex_ffill(&self, dates: &[Date]) -> Vec<f64> {
        let mut out = Vec::with_capacity(dates.len());
        let mut cursor = 0;
        let mut last = f64::NAN;
        for date in dates {
            while cursor < self.dates.len() && self.dates[cursor] <= *date {
                if self.values[cursor].is_finite() {
                    last = self.values[cursor];
                }
                cursor += 1;
            }
            out.push(last);
        }
        out
    }
}

/// A date-indexed table with one value column per ticker.
///
/// Every column has the same length as the date index. Undefined entries
/// are `NaN`; a ticker with no data at all is an all-`NaN` column, not an
/// absent one.
#[derive(Debug, Clone, Default)]
pub struct PriceMatrix {
    dates: Vec<Date>,
    columns: BTreeMap<Symbol, Vec<f64>>,
}

impl PriceMatrix {
    /// Build a matrix from a date index and per-ticker columns.
    ///
    /// # Errors
    ///
    /// Returns an error if the dates are not strictly ascending or a column
    /// length differs from the date index.
    pub fn new(dates: Vec<Date>, columns: BTreeMap<Symbol, Vec<f64>>) -> Result<Self> {
        ensure_ascending(&dates)?;
        for (symbol, values) in &columns {
            if values.len() != dates.len() {
                return Err(RondaError::InvalidData(format!(
                    "column {symbol} has {} values for {} dates",
                    values.len(),
                    dates.len()
                )));
            }
        }
        Ok(Self { dates, columns })
    }

    /// Build a matrix over the union of the series' dates.
    pub fn from_series(series: BTreeMap<Symbol, TimeSeries>) -> Self {
        let dates: Vec<Date> = series
            .values()
            .flat_map(|s| s.dates().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let columns = series
            .into_iter()
            .map(|(symbol, s)| {
                let values = s.reindex(&dates);
                (symbol, values)
            })
            .collect();
        Self { dates, columns }
    }

    /// The date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Tickers in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.columns.keys()
    }

    /// Number of ticker columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Whether the matrix has no dates.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Whether a ticker column exists.
    pub fn contains(&self, symbol: &str) -> bool {
        self.columns.contains_key(symbol)
    }

    /// A ticker's column.
    pub fn column(&self, symbol: &str) -> Option<&[f64]> {
        self.columns.get(symbol).map(Vec::as_slice)
    }

    /// Iterate over (ticker, column) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &[f64])> {
        self.columns.iter().map(|(s, v)| (s, v.as_slice()))
    }

    /// Last value of a ticker's column.
    pub fn latest(&self, symbol: &str) -> Option<f64> {
        self.column(symbol).and_then(|c| c.last().copied())
    }

    /// A ticker's column as a standalone series.
    pub fn series(&self, symbol: &str) -> Option<TimeSeries> {
        self.column(symbol).map(|values| TimeSeries {
            dates: self.dates.clone(),
            values: values.to_vec(),
        })
    }

    /// Insert or replace a column.
    ///
    /// # Errors
    ///
    /// Returns an error if the column length differs from the date index.
    pub fn insert_column(&mut self, symbol: impl Into<Symbol>, values: Vec<f64>) -> Result<()> {
        let symbol = symbol.into();
        if values.len() != self.dates.len() {
            return Err(RondaError::InvalidData(format!(
                "column {symbol} has {} values for {} dates",
                values.len(),
                self.dates.len()
            )));
        }
        self.columns.insert(symbol, values);
        Ok(())
    }

    /// Insert an all-undefined column for a ticker.
    pub fn insert_undefined(&mut self, symbol: impl Into<Symbol>) {
        self.columns
            .insert(symbol.into(), vec![f64::NAN; self.dates.len()]);
    }

    /// The same tickers re-indexed onto `dates`, `NaN` where a date is absent.
    pub fn reindex(&self, dates: &[Date]) -> Self {
        let pos = positions(&self.dates, dates);
        let columns = self
            .columns
            .iter()
            .map(|(symbol, values)| (symbol.clone(), take(values, &pos)))
            .collect();
        Self {
            dates: dates.to_vec(),
            columns,
        }
    }

    /// Restrict both matrices to their common date intersection.
    pub fn align(&self, other: &Self) -> (Self, Self) {
        let common = intersect_dates(&self.dates, &other.dates);
        (self.reindex(&common), other.reindex(&common))
    }

    /// Carry the last finite value of each column forward over `NaN` gaps.
    pub fn ffill(&self) -> Self {
        let columns = self
            .columns
            .iter()
            .map(|(symbol, values)| {
                let mut last = f64::NAN;
                let filled = values
                    .iter()
                    .map(|&v| {
                        if v.is_finite() {
                            last = v;
                        }
                        last
                    })
                    .collect();
                (symbol.clone(), filled)
            })
            .collect();
        Self {
            dates: self.dates.clone(),
            columns,
        }
    }
}

/// One field of an OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceField {
    /// Opening price.
    Open,
    /// Session high.
    High,
    /// Session low.
    Low,
    /// Closing price.
    Close,
    /// Traded volume.
    Volume,
}

impl PriceField {
    /// Column name used in [`MarketData`] frames.
    pub const fn column_name(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Volume => "volume",
        }
    }
}

/// Per-field columns for a single ticker, parallel to the panel date index.
#[derive(Debug, Clone, Default)]
pub struct OhlcvColumns {
    /// Opening prices.
    pub open: Vec<f64>,
    /// Session highs.
    pub high: Vec<f64>,
    /// Session lows.
    pub low: Vec<f64>,
    /// Closing prices.
    pub close: Vec<f64>,
    /// Traded volume.
    pub volume: Vec<f64>,
}

impl OhlcvColumns {
    fn with_capacity(n: usize) -> Self {
        Self {
            open: Vec::with_capacity(n),
            high: Vec::with_capacity(n),
            low: Vec::with_capacity(n),
            close: Vec::with_capacity(n),
            volume: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, [o, h, l, c, v]: [f64; 5]) {
        self.open.push(o);
        self.high.push(h);
        self.low.push(l);
        self.close.push(c);
        self.volume.push(v);
    }

    /// Number of bars.
    pub fn len(&self) -> usize {
        self.close.len()
    }

    /// Whether there are no bars.
    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// The column for one field.
    pub fn field(&self, field: PriceField) -> &[f64] {
        match field {
            PriceField::Open => &self.open,
            PriceField::High => &self.high,
            PriceField::Low => &self.low,
            PriceField::Close => &self.close,
            PriceField::Volume => &self.volume,
        }
    }

    fn consistent(&self) -> bool {
        let n = self.close.len();
        self.open.len() == n && self.high.len() == n && self.low.len() == n && self.volume.len() == n
    }
}

/// OHLCV bars for any number of tickers over one shared date index.
///
/// A single ticker is just a panel with one entry; there is no special case.
#[derive(Debug, Clone, Default)]
pub struct OhlcvPanel {
    dates: Vec<Date>,
    bars: BTreeMap<Symbol, OhlcvColumns>,
}

impl OhlcvPanel {
    /// Build a panel from a date index and per-ticker columns.
    ///
    /// Field columns must match the date index in length. Column contents are
    /// not validated here; malformed bars are reported per ticker by the
    /// calculators that consume them.
    ///
    /// # Errors
    ///
    /// Returns an error if the dates are not ascending or a ticker's field
    /// columns do not all match the date index length.
    pub fn new(dates: Vec<Date>, bars: BTreeMap<Symbol, OhlcvColumns>) -> Result<Self> {
        ensure_ascending(&dates)?;
        for (symbol, columns) in &bars {
            if !columns.consistent() || columns.len() != dates.len() {
                return Err(RondaError::InvalidData(format!(
                    "bars for {symbol} do not match the {} panel dates",
                    dates.len()
                )));
            }
        }
        Ok(Self { dates, bars })
    }

    /// The date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Tickers in sorted order.
    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.bars.keys()
    }

    /// Whether the panel has no dates or no tickers.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.bars.is_empty()
    }

    /// One ticker's bars.
    pub fn bars(&self, symbol: &str) -> Option<&OhlcvColumns> {
        self.bars.get(symbol)
    }

    /// Iterate over (ticker, bars) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &OhlcvColumns)> {
        self.bars.iter()
    }

    /// One field for every ticker as a price matrix.
    pub fn field(&self, field: PriceField) -> PriceMatrix {
        let columns = self
            .bars
            .iter()
            .map(|(symbol, bars)| (symbol.clone(), bars.field(field).to_vec()))
            .collect();
        PriceMatrix {
            dates: self.dates.clone(),
            columns,
        }
    }

    /// Closing prices for every ticker.
    pub fn closes(&self) -> PriceMatrix {
        self.field(PriceField::Close)
    }
}

/// A dense date × ticker matrix of derived values (scores, weights).
///
/// Rows follow the date index, columns follow the ticker list.
#[derive(Debug, Clone, Default)]
pub struct DatedMatrix {
    dates: Vec<Date>,
    symbols: Vec<Symbol>,
    values: Array2<f64>,
}

impl DatedMatrix {
    /// Wrap a values array with its row and column labels.
    ///
    /// # Errors
    ///
    /// Returns an error if the array shape does not match the labels.
    pub fn new(dates: Vec<Date>, symbols: Vec<Symbol>, values: Array2<f64>) -> Result<Self> {
        if values.dim() != (dates.len(), symbols.len()) {
            return Err(RondaError::InvalidData(format!(
                "matrix shape {:?} does not match {} dates x {} symbols",
                values.dim(),
                dates.len(),
                symbols.len()
            )));
        }
        Ok(Self {
            dates,
            symbols,
            values,
        })
    }

    /// Row labels.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Column labels.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// The underlying array (rows = dates, columns = symbols).
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// A ticker's column.
    pub fn column(&self, symbol: &str) -> Option<ArrayView1<'_, f64>> {
        self.symbols
            .iter()
            .position(|s| s == symbol)
            .map(|j| self.values.column(j))
    }

    /// Value for one (date, ticker) cell.
    pub fn get(&self, date: Date, symbol: &str) -> Option<f64> {
        let i = self.dates.binary_search(&date).ok()?;
        let j = self.symbols.iter().position(|s| s == symbol)?;
        Some(self.values[[i, j]])
    }

    /// Convert to a wide DataFrame with a `date` column followed by one
    /// column per ticker.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(self.symbols.len() + 1);
        columns.push(Series::new("date".into(), self.dates.as_slice()).into());
        for (j, symbol) in self.symbols.iter().enumerate() {
            let values: Vec<f64> = self.values.column(j).to_vec();
            columns.push(Series::new(symbol.as_str().into(), values).into());
        }
        Ok(DataFrame::new(columns)?)
    }
}
