//! Performance statistics of an equity curve.
//!
//! Every ratio falls back to `0.0` when its denominator is zero or
//! undefined, so a flat curve reports zeros rather than `NaN` or infinity.

use ronda_traits::TimeSeries;
use ronda_traits::stats::{mean, pct_change, sample_std};
use serde::{Deserialize, Serialize};

/// Trading days used to annualize daily statistics.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Calendar days per year used for CAGR.
pub const CALENDAR_DAYS_PER_YEAR: f64 = 365.25;

/// Summary statistics of one equity curve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// Last equity over first equity, minus one.
    pub total_return: f64,
    /// Compound annual growth over elapsed calendar days.
    pub cagr: f64,
    /// Annualized standard deviation of daily returns.
    pub volatility: f64,
    /// Annualized mean over standard deviation of daily returns.
    pub sharpe: f64,
    /// Annualized mean over downside deviation.
    pub sortino: f64,
    /// Deepest peak-to-trough decline, as a non-positive fraction.
    pub max_drawdown: f64,
    /// CAGR over the absolute maximum drawdown.
    pub calmar: f64,
}

impl PerformanceMetrics {
    /// Compute the statistics of `equity`.
    ///
    /// Returns all zeros for a curve with fewer than two points.
    pub fn from_equity(equity: &TimeSeries) -> Self {
        let values = equity.values();
        let (Some(first), Some(last)) = (equity.dates().first(), equity.dates().last()) else {
            return Self::default();
        };
        let returns: Vec<f64> = pct_change(values)
            .into_iter()
            .filter(|r| r.is_finite())
            .collect();
        if returns.is_empty() {
            return Self::default();
        }

        let total_return = values[values.len() - 1] / values[0] - 1.0;

        let years = (*last - *first).num_days() as f64 / CALENDAR_DAYS_PER_YEAR;
        let cagr = if years > 0.0 {
            (1.0 + total_return).powf(1.0 / years) - 1.0
        } else {
            0.0
        };

        let mean_return = mean(&returns);
        let std = finite_or_zero(sample_std(&returns));
        let annualizer = TRADING_DAYS_PER_YEAR.sqrt();
        let volatility = std * annualizer;
        let sharpe = ratio(mean_return, std) * annualizer;

        let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
        let downside_std = finite_or_zero(sample_std(&downside));
        let sortino = ratio(mean_return, downside_std) * annualizer;

        let max_drawdown = max_drawdown(values);
        let calmar = ratio(cagr, max_drawdown.abs());

        Self {
            total_return,
            cagr,
            volatility,
            sharpe,
            sortino,
            max_drawdown,
            calmar,
        }
    }

    /// Named values in report order.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("Total Return", self.total_return),
            ("CAGR", self.cagr),
            ("Volatility", self.volatility),
            ("Sharpe", self.sharpe),
            ("Sortino", self.sortino),
            ("Max Drawdown", self.max_drawdown),
            ("Calmar", self.calmar),
        ]
    }
}

/// Minimum of `(equity - running max) / running max`.
///
/// Zero for a curve that never falls below its previous peak.
pub fn max_drawdown(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &value in equity.iter().filter(|v| v.is_finite()) {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.min((value - peak) / peak);
        }
    }
    worst
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() || !numerator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
