//! Score to action mapping and trade rationale.

use std::fmt;

use ronda_traits::config::ActionConfig;
use ronda_traits::{SignalKind, SignalReport};
use serde::{Deserialize, Serialize};

use crate::composite::SignalReports;

/// Rationale body when no signal fired.
pub const NO_TRIGGERS: &str = "No specific triggers";

/// A discrete trade action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    /// Undervalued: open or keep a position.
    Buy,
    /// Inside the neutral band.
    Hold,
    /// Overvalued: close the position.
    Sell,
}

impl Action {
    /// Upper-case label used in reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `BUY` if `score <= buy`, `SELL` if `score >= sell`, otherwise `HOLD`.
///
/// The comparisons are independent; `BUY` wins if both hold.
#[must_use]
pub fn action(score: f64, buy: f64, sell: f64) -> Action {
    if score <= buy {
        Action::Buy
    } else if score >= sell {
        Action::Sell
    } else {
        Action::Hold
    }
}

/// Maps composite scores to actions and explains them.
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    thresholds: ActionConfig,
}

impl RulesEngine {
    /// Create a rules engine with the given thresholds.
    #[must_use]
    pub const fn new(thresholds: ActionConfig) -> Self {
        Self { thresholds }
    }

    /// Get the thresholds.
    #[must_use]
    pub const fn thresholds(&self) -> &ActionConfig {
        &self.thresholds
    }

    /// Action for one composite score.
    #[must_use]
    pub fn action(&self, score: f64) -> Action {
        action(score, self.thresholds.buy, self.thresholds.sell)
    }

    /// Families whose reading for `ticker` fired, in rationale order.
    #[must_use]
    pub fn signals_fired(&self, ticker: &str, reports: &SignalReports) -> Vec<SignalKind> {
        reports
            .iter()
            .filter(|(_, report)| fired(report, ticker).is_some())
            .map(|(kind, _)| *kind)
            .collect()
    }

    /// One deterministic sentence explaining the action, e.g.
    /// `BUY: VTV - Prem/Disc: -1.20%, Z: -2.40, Vol Z: 2.10; composite=-0.92`.
    #[must_use]
    pub fn rationale(
        &self,
        ticker: &str,
        action: Action,
        score: f64,
        reports: &SignalReports,
    ) -> String {
        let parts: Vec<&str> = reports
            .values()
            .filter_map(|report| fired(report, ticker))
            .collect();
        let body = if parts.is_empty() {
            NO_TRIGGERS.to_string()
        } else {
            parts.join(", ")
        };
        format!("{action}: {ticker} - {body}; composite={score:.2}")
    }
}

fn fired<'a>(report: &'a SignalReport, ticker: &str) -> Option<&'a str> {
    report
        .for_ticker(ticker)
        .filter(|r| r.triggered)
        .map(|r| r.details.as_str())
}
