//! Position simulation: hold state, sizing and daily portfolio accounting.
//!
//! All matrices are rows = dates, columns = tickers, on one shared grid.

use ndarray::{Array1, Array2, Axis, Zip};
use ronda_traits::config::{ActionConfig, RiskConfig};

/// Per-ticker two-state scan over the date axis.
///
/// A row enters the held state (1.0) when its score is at or below `buy`,
/// leaves it (0.0) at or above `sell`, and otherwise keeps the previous
/// day's state. The sell test is applied last, so it wins when both hold.
/// Every ticker starts flat.
pub fn hold_targets(scores: &Array2<f64>, actions: &ActionConfig) -> Array2<f64> {
    let mut targets = Array2::<f64>::zeros(scores.raw_dim());
    for (mut held, column) in targets
        .axis_iter_mut(Axis(1))
        .zip(scores.axis_iter(Axis(1)))
    {
        let mut state = 0.0;
        for (t, &score) in column.iter().enumerate() {
            if score <= actions.buy {
                state = 1.0;
            }
            if score >= actions.sell {
                state = 0.0;
            }
            held[t] = state;
        }
    }
    targets
}

/// Size held targets into capital weights.
///
/// Each held ticker gets `per_pos_cap`. When a day's total exposure exceeds
/// `bucket_cap` every weight on that day is scaled by the same factor
/// `bucket_cap / exposure`.
pub fn size_positions(targets: &Array2<f64>, risk: &RiskConfig) -> Array2<f64> {
    let mut weights = targets.mapv(|t| t * risk.per_pos_cap);
    for mut row in weights.axis_iter_mut(Axis(0)) {
        let exposure = row.sum();
        if exposure > risk.bucket_cap {
            let scale = risk.bucket_cap / exposure;
            row.mapv_inplace(|w| w * scale);
        }
    }
    weights
}

/// Simple close-to-close returns per column; the first row is `NaN`.
pub fn asset_returns(closes: &Array2<f64>) -> Array2<f64> {
    let mut returns = Array2::from_elem(closes.raw_dim(), f64::NAN);
    for t in 1..closes.nrows() {
        Zip::from(returns.row_mut(t))
            .and(closes.row(t - 1))
            .and(closes.row(t))
            .for_each(|r, &prev, &curr| {
                if prev.is_finite() && prev != 0.0 {
                    *r = curr / prev - 1.0;
                }
            });
    }
    returns
}

/// Gross portfolio return per day: `sum_j w[t-1, j] * r[t, j]`.
///
/// Weights are those decided at the previous close; undefined returns are
/// skipped. The first day earns nothing.
pub fn portfolio_returns(weights: &Array2<f64>, returns: &Array2<f64>) -> Array1<f64> {
    let mut gross = Array1::<f64>::zeros(weights.nrows());
    for t in 1..weights.nrows() {
        gross[t] = weights
            .row(t - 1)
            .iter()
            .zip(returns.row(t))
            .filter(|(w, r)| w.is_finite() && r.is_finite())
            .map(|(w, r)| w * r)
            .sum();
    }
    gross
}

/// Daily turnover `sum_j |w[t, j] - w[t-1, j]|`; zero on the first day.
pub fn turnover(weights: &Array2<f64>) -> Array1<f64> {
    let mut out = Array1::<f64>::zeros(weights.nrows());
    for t in 1..weights.nrows() {
        out[t] = (&weights.row(t) - &weights.row(t - 1)).mapv(f64::abs).sum();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use proptest::prelude::*;

    fn actions() -> ActionConfig {
        ActionConfig {
            buy: -0.8,
            sell: 0.8,
        }
    }

    #[test]
    fn test_hold_persists_through_neutral_band() {
        let scores = array![[0.0], [-1.0], [0.5], [-0.3], [0.79], [0.8], [0.1], [-0.8]];
        let targets = hold_targets(&scores, &actions());
        assert_eq!(
            targets.column(0).to_vec(),
            vec![0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_hold_targets_per_ticker_independent() {
        let scores = array![[-1.0, 0.0], [0.0, -1.0], [1.0, 0.0]];
        let targets = hold_targets(&scores, &actions());
        assert_eq!(targets, array![[1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
    }

    #[test]
    fn test_exit_wins_when_thresholds_overlap() {
        let equal = ActionConfig { buy: 0.0, sell: 0.0 };
        assert_eq!(hold_targets(&array![[0.0]], &equal), array![[0.0]]);

        let inverted = ActionConfig { buy: 0.5, sell: -0.5 };
        let scores = array![[1.0], [0.0], [-1.0], [0.7]];
        assert_eq!(
            hold_targets(&scores, &inverted).column(0).to_vec(),
            vec![0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_size_positions_scales_to_bucket() {
        let risk = RiskConfig {
            per_pos_cap: 0.08,
            bucket_cap: 0.20,
        };
        let targets = array![[1.0, 1.0, 0.0], [1.0, 1.0, 1.0]];
        let weights = size_positions(&targets, &risk);
        assert_relative_eq!(weights[[0, 0]], 0.08);
        assert_relative_eq!(weights[[0, 1]], 0.08);
        assert_relative_eq!(weights.row(1).sum(), 0.20, epsilon = 1e-12);
        assert_relative_eq!(weights[[1, 2]], 0.20 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_returns_use_previous_weights() {
        let closes = array![[100.0, 50.0], [110.0, 50.0], [99.0, 55.0]];
        let weights = array![[0.1, 0.0], [0.0, 0.2], [0.0, 0.0]];
        let gross = portfolio_returns(&weights, &asset_returns(&closes));
        assert_eq!(gross[0], 0.0);
        assert_relative_eq!(gross[1], 0.1 * 0.10, epsilon = 1e-12);
        assert_relative_eq!(gross[2], 0.2 * 0.10, epsilon = 1e-12);
    }

    #[test]
    fn test_returns_skip_undefined_prices() {
        let closes = array![[100.0, f64::NAN], [101.0, 20.0]];
        let weights = array![[0.1, 0.1], [0.1, 0.1]];
        let gross = portfolio_returns(&weights, &asset_returns(&closes));
        assert_relative_eq!(gross[1], 0.1 * 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_turnover() {
        let weights = array![[0.08, 0.0], [0.0, 0.08], [0.0, 0.08]];
        let turnover = turnover(&weights);
        assert_eq!(turnover[0], 0.0);
        assert_relative_eq!(turnover[1], 0.16, epsilon = 1e-12);
        assert_eq!(turnover[2], 0.0);
    }

    proptest! {
        #[test]
        fn prop_exposure_never_exceeds_bucket(
            held in proptest::collection::vec(proptest::bool::ANY, 60),
            per_pos_cap in 0.01f64..1.0,
            bucket_cap in 0.01f64..1.0,
        ) {
            let targets = Array2::from_shape_fn((6, 10), |(i, j)| {
                if held[i * 10 + j] { 1.0 } else { 0.0 }
            });
            let weights = size_positions(&targets, &RiskConfig { per_pos_cap, bucket_cap });
            for row in weights.axis_iter(Axis(0)) {
                prop_assert!(row.sum() <= bucket_cap + 1e-12);
                prop_assert!(row.iter().all(|w| *w >= 0.0 && *w <= per_pos_cap + 1e-12));
            }
        }

        #[test]
        fn prop_hold_is_two_state_scan(
            scores in proptest::collection::vec(-3.0f64..3.0, 1..80),
        ) {
            let column = Array2::from_shape_vec((scores.len(), 1), scores.clone()).unwrap();
            let targets = hold_targets(&column, &actions());
            let mut previous = 0.0;
            for (t, score) in scores.iter().enumerate() {
                let expected = if *score <= -0.8 {
                    1.0
                } else if *score >= 0.8 {
                    0.0
                } else {
                    previous
                };
                prop_assert_eq!(targets[[t, 0]], expected);
                previous = expected;
            }
        }
    }
}
