//! Tradable universe from CSV profile files.
//!
//! A universe file has a `ticker` column and an optional `benchmark_proxy`
//! column naming the ticker whose closes serve as fair-value reference.
//! Header names are matched case-insensitively.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;
use regex::Regex;
use ronda_traits::config::UniverseConfig;
use ronda_traits::{Result, RondaError, Symbol};
use tracing::info;

use crate::store::normalize_headers;

/// One row of a universe file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseEntry {
    /// Ticker symbol.
    pub ticker: Symbol,
    /// Benchmark used as NAV proxy, if any.
    pub benchmark_proxy: Option<Symbol>,
}

/// The filtered universe plus the benchmark map of every listed ticker.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    entries: Vec<UniverseEntry>,
    tickers: Vec<Symbol>,
}

impl Universe {
    /// Load the configured profile and apply its filters.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile is unknown, the file cannot be read,
    /// or an exclude pattern is not a valid regular expression.
    pub fn load(config: &UniverseConfig) -> Result<Self> {
        let path = config.profile_path()?;
        info!(profile = %config.profile, path = %path.display(), "loading universe profile");
        Self::from_file(path, config)
    }

    /// Load a specific universe file, applying the filters of `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has no `ticker` column,
    /// or an exclude pattern is invalid.
    pub fn from_file(path: &Path, config: &UniverseConfig) -> Result<Self> {
        let entries = read_entries(path)?;
        Self::new(entries, &config.exclude_patterns, &config.allowlist)
    }

    /// Build a universe from entries and static filters.
    ///
    /// A ticker is dropped when any exclude pattern matches it, unless it is
    /// on the allowlist.
    ///
    /// # Errors
    ///
    /// Returns an error if an exclude pattern is invalid.
    pub fn new(
        entries: Vec<UniverseEntry>,
        exclude_patterns: &[String],
        allowlist: &[String],
    ) -> Result<Self> {
        let exclude = if exclude_patterns.is_empty() {
            None
        } else {
            let pattern = exclude_patterns.join("|");
            Some(Regex::new(&pattern).map_err(|e| {
                RondaError::InvalidConfig(format!("invalid exclude pattern '{pattern}': {e}"))
            })?)
        };

        let tickers: Vec<Symbol> = entries
            .iter()
            .map(|e| &e.ticker)
            .filter(|ticker| {
                let excluded = exclude.as_ref().is_some_and(|re| re.is_match(ticker));
                !excluded || allowlist.contains(ticker)
            })
            .cloned()
            .collect();

        info!(
            listed = entries.len(),
            selected = tickers.len(),
            "universe loaded after static filters"
        );
        Ok(Self { entries, tickers })
    }

    /// Tickers that passed the filters, in file order.
    pub fn tickers(&self) -> &[Symbol] {
        &self.tickers
    }

    /// Every row of the file, filtered or not.
    pub fn entries(&self) -> &[UniverseEntry] {
        &self.entries
    }

    /// Number of selected tickers.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether no ticker was selected.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Ticker to benchmark proxy, for rows that name one.
    pub fn benchmark_map(&self) -> BTreeMap<Symbol, Symbol> {
        self.entries
            .iter()
            .filter_map(|e| Some((e.ticker.clone(), e.benchmark_proxy.clone()?)))
            .collect()
    }
}

fn read_entries(path: &Path) -> Result<Vec<UniverseEntry>> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    normalize_headers(&mut df)?;

    let tickers = df
        .column("ticker")
        .map_err(|_| {
            RondaError::MissingColumn(format!("ticker in universe file {}", path.display()))
        })?
        .as_materialized_series()
        .str()?;
    let proxies = match df.column("benchmark_proxy") {
        Ok(column) => Some(column.as_materialized_series().str()?),
        Err(_) => None,
    };

    let mut entries = Vec::with_capacity(df.height());
    for (i, ticker) in tickers.into_iter().enumerate() {
        let Some(ticker) = ticker.map(str::trim).filter(|t| !t.is_empty()) else {
            continue;
        };
        let benchmark_proxy = proxies
            .as_ref()
            .and_then(|p| p.get(i))
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(str::to_string);
        entries.push(UniverseEntry {
            ticker: ticker.to_string(),
            benchmark_proxy,
        });
    }
    Ok(entries)
}
