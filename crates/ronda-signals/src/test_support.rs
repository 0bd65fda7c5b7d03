//! Synthetic fixtures shared by the calculator tests.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Weekday};
use ronda_traits::{Date, OhlcvColumns, OhlcvPanel, PriceMatrix, TimeSeries};

/// `n` consecutive weekdays starting 2023-01-02.
pub(crate) fn business_days(n: usize) -> Vec<Date> {
    let mut out = Vec::with_capacity(n);
    let mut date = Date::from_ymd_opt(2023, 1, 2).unwrap();
    while out.len() < n {
        if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            out.push(date);
        }
        date += Duration::days(1);
    }
    out
}

/// Deterministic wiggle in [-1, 1] so rolling windows never have zero variance.
pub(crate) fn wiggle(i: usize) -> f64 {
    ((i * 7919) % 101) as f64 / 50.0 - 1.0
}

/// Bars with a 2% high-low range around each close and constant-ish volume.
pub(crate) fn bars(closes: &[f64]) -> OhlcvColumns {
    OhlcvColumns {
        open: closes.to_vec(),
        high: closes.iter().map(|c| c * 1.01).collect(),
        low: closes.iter().map(|c| c * 0.99).collect(),
        close: closes.to_vec(),
        volume: (0..closes.len())
            .map(|i| 1_000_000.0 + 10_000.0 * wiggle(i))
            .collect(),
    }
}

pub(crate) fn panel(dates: &[Date], tickers: Vec<(&str, OhlcvColumns)>) -> OhlcvPanel {
    let bars = tickers
        .into_iter()
        .map(|(s, b)| (s.to_string(), b))
        .collect::<BTreeMap<_, _>>();
    OhlcvPanel::new(dates.to_vec(), bars).unwrap()
}

pub(crate) fn matrix(dates: &[Date], columns: Vec<(&str, Vec<f64>)>) -> PriceMatrix {
    let columns = columns
        .into_iter()
        .map(|(s, v)| (s.to_string(), v))
        .collect::<BTreeMap<_, _>>();
    PriceMatrix::new(dates.to_vec(), columns).unwrap()
}

pub(crate) fn series(dates: &[Date], values: Vec<f64>) -> TimeSeries {
    TimeSeries::new(dates.to_vec(), values).unwrap()
}
