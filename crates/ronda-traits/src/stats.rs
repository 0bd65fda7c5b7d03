//! Statistical utility functions for signal processing.
//!
//! This module provides the rolling statistics every calculator is built on:
//! trailing means, sample standard deviations and rolling z-scores, plus
//! first differences and percentage changes.
//!
//! All functions are `NaN`-aware: a window containing any non-finite value
//! produces `NaN`, never a partial statistic.

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Arithmetic mean of the finite values in a slice.
///
/// Returns `NaN` if there are no finite values.
pub fn mean(values: &[f64]) -> f64 {
    let (sum, n) = values
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, n), x| (s + x, n + 1));
    if n == 0 { f64::NAN } else { sum / n as f64 }
}

/// Sample standard deviation (N-1 denominator) of the finite values in a slice.
///
/// Returns `NaN` with fewer than two finite values.
pub fn sample_std(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().filter(|x| x.is_finite()).copied().collect();
    if finite.len() < 2 {
        return f64::NAN;
    }
    let m = finite.iter().sum::<f64>() / finite.len() as f64;
    let variance =
        finite.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (finite.len() - 1) as f64;
    variance.sqrt()
}

/// Trailing mean and sample standard deviation over `window` observations.
///
/// Entry `t` covers `values[t + 1 - window ..= t]`. The first `window - 1`
/// entries, and any window containing a non-finite value, are `(NaN, NaN)`.
pub fn rolling_mean_std(values: &[f64], window: usize) -> Vec<(f64, f64)> {
    let mut out = vec![(f64::NAN, f64::NAN); values.len()];
    if window < 2 || values.len() < window {
        return out;
    }
    for t in (window - 1)..values.len() {
        let slice = &values[t + 1 - window..=t];
        if slice.iter().any(|x| !x.is_finite()) {
            continue;
        }
        let m = slice.iter().sum::<f64>() / window as f64;
        let variance = slice.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (window - 1) as f64;
        out[t] = (m, variance.sqrt());
    }
    out
}

/// Rolling z-score: `(x_t - mean_t) / std_t` over a trailing window that
/// includes `x_t` itself.
///
/// Undefined (`NaN`) for the first `window - 1` entries, where the window
/// contains a non-finite value, and where the standard deviation is not
/// above [`MIN_STD_THRESHOLD`]. A window shorter than 2 yields all `NaN`.
///
/// # Examples
///
/// ```
/// use ronda_traits::stats::rolling_zscore;
///
/// let z = rolling_zscore(&[1.0, 2.0, 3.0, 4.0, 5.0], 5);
/// assert!(z[3].is_nan());
/// // mean 3, sample std sqrt(2.5)
/// assert!((z[4] - 2.0 / 2.5_f64.sqrt()).abs() < 1e-12);
/// ```
pub fn rolling_zscore(values: &[f64], window: usize) -> Vec<f64> {
    rolling_mean_std(values, window)
        .into_iter()
        .zip(values)
        .map(|((m, s), x)| {
            if s.is_finite() && s > MIN_STD_THRESHOLD {
                (x - m) / s
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// First difference, `x_t - x_{t-1}`; the first entry is `NaN`.
pub fn diff(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(values.windows(2).map(|w| w[1] - w[0]));
    out
}

/// Simple percentage change, `x_t / x_{t-1} - 1`.
///
/// The first entry is `NaN`, as is any entry whose previous value is zero
/// or non-finite.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    if values.is_empty() {
        return out;
    }
    out.push(f64::NAN);
    out.extend(values.windows(2).map(|w| {
        if w[0].is_finite() && w[0] != 0.0 {
            w[1] / w[0] - 1.0
        } else {
            f64::NAN
        }
    }));
    out
}
