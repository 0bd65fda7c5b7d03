//! Signed weighted composite of the four dislocation signals.

use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array1, Array2, Zip};
use ronda_traits::config::WeightConfig;
use ronda_traits::{Result, SignalKind, SignalReport, SignalResult, Symbol};

use crate::combiner::{Combiner, SignalScore, validate_lengths};

/// Latest-mode reports keyed by family. Iteration follows rationale order.
pub type SignalReports = BTreeMap<SignalKind, SignalReport>;

/// Composite scorer.
///
/// ```text
/// score = w_premdisc * z_premdisc + w_divergence * z_divergence
///       - w_volume * z_volume - w_cross_asset * s_stress
/// ```
///
/// Premium/discount and divergence keep their natural sign. Volume and
/// cross-asset stress are subtracted, so a panic reading pushes a discounted
/// ticker further towards BUY instead of cancelling it. Undefined inputs
/// contribute exactly zero. `s_stress` is the stress intensity mapped through
/// the configured [`StressScaling`](ronda_traits::StressScaling).
///
/// # Examples
///
/// ```rust
/// use ronda_combine::{Combiner, CompositeScorer, SignalScore};
/// use ronda_traits::SignalKind;
/// use ronda_traits::config::WeightConfig;
/// use ndarray::Array1;
///
/// let scorer = CompositeScorer::new(WeightConfig {
///     premdisc: 0.5,
///     divergence: 0.0,
///     volume: 0.5,
///     cross_asset: 0.0,
///     ..WeightConfig::default()
/// });
///
/// let composite = scorer
///     .combine(&[
///         SignalScore::new(SignalKind::PremiumDiscount, Array1::from_vec(vec![-2.0])),
///         SignalScore::new(SignalKind::Volume, Array1::from_vec(vec![2.0])),
///     ])
///     .unwrap();
/// assert_eq!(composite[0], -2.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    weights: WeightConfig,
}

impl CompositeScorer {
    /// Create a scorer with the given weights.
    #[must_use]
    pub const fn new(weights: WeightConfig) -> Self {
        Self { weights }
    }

    /// Get the weights.
    #[must_use]
    pub const fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    /// Signed weight applied to one family.
    #[must_use]
    pub const fn coefficient(&self, kind: SignalKind) -> f64 {
        match kind {
            SignalKind::PremiumDiscount => self.weights.premdisc,
            SignalKind::Divergence => self.weights.divergence,
            SignalKind::Volume => -self.weights.volume,
            SignalKind::CrossAsset => -self.weights.cross_asset,
        }
    }

    /// Contribution of one input value to the composite.
    fn contribution(&self, kind: SignalKind, value: f64) -> f64 {
        let input = match kind {
            SignalKind::CrossAsset => self.weights.stress_scaling.apply(value),
            _ if value.is_finite() => value,
            _ => 0.0,
        };
        self.coefficient(kind) * input
    }

    /// Composite score per ticker from latest-mode reports.
    ///
    /// The ticker set is the union of every per-ticker report. A ticker a
    /// report does not cover contributes zero for that family.
    pub fn score_latest(&self, reports: &SignalReports) -> Result<BTreeMap<Symbol, f64>> {
        let tickers: Vec<Symbol> = reports
            .values()
            .filter_map(|report| match report {
                SignalReport::PerTicker(results) => Some(results.keys()),
                SignalReport::Global(_) => None,
            })
            .flatten()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if tickers.is_empty() || reports.is_empty() {
            return Ok(BTreeMap::new());
        }

        let signals: Vec<SignalScore> = reports
            .iter()
            .map(|(&kind, report)| {
                let scores = tickers
                    .iter()
                    .map(|t| report.for_ticker(t).map_or(0.0, |r| input_value(kind, r)))
                    .collect::<Array1<f64>>();
                SignalScore::new(kind, scores)
            })
            .collect();

        let composite = self.combine(&signals)?;
        Ok(tickers.into_iter().zip(composite.iter().copied()).collect())
    }

    /// Composite score matrix (rows = dates, columns = tickers) from
    /// series-mode streams already re-indexed onto one grid.
    ///
    /// # Errors
    ///
    /// Returns an error if no streams are given or their shapes differ.
    pub fn score_matrix(&self, streams: &[(SignalKind, Array2<f64>)]) -> Result<Array2<f64>> {
        let Some((_, first)) = streams.first() else {
            return Err("no signal streams to combine".into());
        };
        let dim = first.dim();
        let mut composite = Array2::<f64>::zeros(dim);
        for (kind, matrix) in streams {
            if matrix.dim() != dim {
                return Err(format!(
                    "Signal '{}' has shape {:?}, expected {:?}",
                    kind.key(),
                    matrix.dim(),
                    dim
                )
                .into());
            }
            Zip::from(&mut composite)
                .and(matrix)
                .for_each(|c, &v| *c += self.contribution(*kind, v));
        }
        Ok(composite)
    }
}

/// The value the scorer reads from a latest-mode result: the z-score, or the
/// intensity for the stress overlay.
fn input_value(kind: SignalKind, result: &SignalResult) -> f64 {
    match kind {
        SignalKind::CrossAsset => result.value.filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => result.zscore_or_zero(),
    }
}

impl Combiner for CompositeScorer {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let n_assets = validate_lengths(signals)?;
        let mut composite = Array1::zeros(n_assets);
        for signal in signals {
            Zip::from(&mut composite)
                .and(&signal.scores)
                .for_each(|c, &v| *c += self.contribution(signal.kind, v));
        }
        Ok(composite)
    }

    fn name(&self) -> &str {
        "composite"
    }
}
