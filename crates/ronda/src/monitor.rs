//! Latest-day monitoring: signals, composite score, action and rationale
//! for every ticker.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use polars::prelude::*;
use ronda_combine::{Action, CompositeScorer, RulesEngine, SignalReports};
use ronda_signals::build_signals;
use ronda_traits::{Config, Date, MarketInputs, Result, RondaError, SignalKind, Symbol};
use serde::Serialize;
use tracing::{debug, info};

/// One line of the recommendations table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRow {
    /// Ticker symbol.
    pub ticker: Symbol,
    /// Action implied by the composite score.
    pub action: Action,
    /// Composite score.
    pub score: f64,
    /// Families whose reading fired, in rationale order.
    pub signals_fired: Vec<SignalKind>,
    /// Human-readable explanation.
    pub rationale: String,
}

/// Output of one monitor run.
#[derive(Debug, Clone)]
pub struct MonitorReport {
    /// Last date of the price data.
    pub as_of: Option<Date>,
    /// Rows sorted by ascending score, strongest BUY first.
    pub rows: Vec<ScoredRow>,
    /// The per-family readings the rows were built from.
    pub reports: SignalReports,
}

impl MonitorReport {
    /// Rows whose action is not HOLD, in table order.
    pub fn actionable(&self) -> impl Iterator<Item = &ScoredRow> {
        self.rows.iter().filter(|r| r.action != Action::Hold)
    }

    /// Table with `ticker`, `action`, `score` (two decimals), `signals_fired`
    /// and `rationale` columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let tickers: Vec<&str> = self.rows.iter().map(|r| r.ticker.as_str()).collect();
        let actions: Vec<&str> = self.rows.iter().map(|r| r.action.as_str()).collect();
        let scores: Vec<f64> = self
            .rows
            .iter()
            .map(|r| (r.score * 100.0).round() / 100.0)
            .collect();
        let fired: Vec<String> = self
            .rows
            .iter()
            .map(|r| {
                r.signals_fired
                    .iter()
                    .map(SignalKind::key)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .collect();
        let rationales: Vec<&str> = self.rows.iter().map(|r| r.rationale.as_str()).collect();

        let df = df! {
            "ticker" => tickers,
            "action" => actions,
            "score" => scores,
            "signals_fired" => fired,
            "rationale" => rationales,
        }?;
        Ok(df)
    }

    /// Write the table to `recs_<as_of>.csv` inside `out_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the report has no date or the file cannot be written.
    pub fn write_csv(&self, out_dir: &Path) -> Result<PathBuf> {
        let as_of = self
            .as_of
            .ok_or_else(|| RondaError::NoData("monitor report has no date".to_string()))?;
        fs::create_dir_all(out_dir)?;
        let path = out_dir.join(format!("recs_{as_of}.csv"));
        let mut file = File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut self.to_dataframe()?)?;
        info!(path = %path.display(), "recommendations saved");
        Ok(path)
    }
}

/// Latest-mode pipeline over a run configuration.
#[derive(Debug, Clone, Default)]
pub struct Monitor {
    config: Config,
}

impl Monitor {
    /// Create a monitor for a validated run configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Score every ticker on the latest available day.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::NoData`] if there are no prices, and propagates
    /// signal errors.
    pub fn run(&self, inputs: &MarketInputs<'_>) -> Result<MonitorReport> {
        if inputs.ohlcv.is_empty() {
            return Err(RondaError::NoData("no market data for monitor".to_string()));
        }
        let as_of = inputs.ohlcv.dates().last().copied();

        let mut reports = SignalReports::new();
        for signal in build_signals(&self.config) {
            let report = signal.latest(inputs)?;
            debug!(signal = signal.name(), "latest reading computed");
            reports.insert(signal.kind(), report);
        }

        let scores = CompositeScorer::new(self.config.weights).score_latest(&reports)?;
        let rules = RulesEngine::new(self.config.actions);

        let mut rows: Vec<ScoredRow> = scores
            .into_iter()
            .map(|(ticker, score)| {
                let action = rules.action(score);
                ScoredRow {
                    signals_fired: rules.signals_fired(&ticker, &reports),
                    rationale: rules.rationale(&ticker, action, score, &reports),
                    ticker,
                    action,
                    score,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.score.total_cmp(&b.score));

        info!(
            as_of = ?as_of,
            tickers = rows.len(),
            buys = rows.iter().filter(|r| r.action == Action::Buy).count(),
            sells = rows.iter().filter(|r| r.action == Action::Sell).count(),
            "monitor complete"
        );
        Ok(MonitorReport {
            as_of,
            rows,
            reports,
        })
    }
}
