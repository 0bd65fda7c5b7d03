//! Core trait definition for signal combiners.

use ndarray::Array1;
use ronda_traits::{Result, SignalKind};

/// Score output from a single signal for combination.
///
/// Each signal contributes one value per ticker (a z-score, or the stress
/// intensity for the cross-asset overlay). The combiner takes all four and
/// produces the composite score.
#[derive(Debug, Clone)]
pub struct SignalScore {
    /// Label used in error messages.
    pub name: String,
    /// Family, which decides the sign of the contribution.
    pub kind: SignalKind,
    /// One value per ticker.
    pub scores: Array1<f64>,
}

impl SignalScore {
    /// Scores for one signal family, named after the family.
    pub fn new(kind: SignalKind, scores: Array1<f64>) -> Self {
        Self {
            name: kind.key().to_string(),
            kind,
            scores,
        }
    }
}

/// Blends per-family signal vectors into one score per ticker.
///
/// Implementations decide the sign and weight of every family. The vectors
/// are aligned by position, so entry `i` of every input refers to the same
/// ticker.
///
/// ```rust,no_run
/// use ronda_combine::{Combiner, SignalScore};
/// use ndarray::Array1;
///
/// /// Reads only the premium/discount family.
/// struct PremiumOnly;
///
/// impl Combiner for PremiumOnly {
///     fn combine(&self, signals: &[SignalScore]) -> ronda_traits::Result<Array1<f64>> {
///         signals
///             .iter()
///             .find(|s| s.kind == ronda_traits::SignalKind::PremiumDiscount)
///             .map(|s| s.scores.clone())
///             .ok_or_else(|| "no premium/discount scores".into())
///     }
///
///     fn name(&self) -> &str {
///         "premium_only"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Composite score per ticker.
    ///
    /// # Errors
    ///
    /// Returns an error when `signals` is empty or the vectors differ in length.
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

/// Check that `signals` is non-empty and uniformly sized; returns the size.
pub(crate) fn validate_lengths(signals: &[SignalScore]) -> Result<usize> {
    let Some(first) = signals.first() else {
        return Err("no signal families to combine".into());
    };
    let tickers = first.scores.len();
    if let Some(bad) = signals.iter().find(|s| s.scores.len() != tickers) {
        return Err(format!(
            "signal '{}' covers {} tickers, expected {tickers}",
            bad.name,
            bad.scores.len()
        )
        .into());
    }
    Ok(tickers)
}
