//! Backtesting engine.
//!
//! Replays the full signal pipeline over history: series-mode signal
//! streams, composite scores, a two-state hold simulation, capped position
//! sizing and transaction costs, ending in an equity curve over the
//! requested range.

use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use ronda_combine::CompositeScorer;
use ronda_signals::build_signals;
use ronda_traits::{
    Config, Date, DatedMatrix, MarketInputs, Result, RondaError, SignalKind, Symbol, TimeSeries,
};
use tracing::{debug, info, warn};

use crate::metrics::PerformanceMetrics;
use crate::position::{asset_returns, hold_targets, portfolio_returns, size_positions, turnover};

/// Backtesting results over the requested range.
#[derive(Debug, Clone)]
pub struct BacktestResult {
    /// Cumulative product of `1 + net return`.
    pub equity_curve: TimeSeries,
    /// Daily return after costs.
    pub net_returns: TimeSeries,
    /// Daily sum of absolute weight changes.
    pub turnover: TimeSeries,
    /// Daily cost charged against the return.
    pub costs: TimeSeries,
    /// Position weights decided at each close.
    pub weights: DatedMatrix,
    /// Composite scores.
    pub scores: DatedMatrix,
    /// Performance statistics of the equity curve.
    pub metrics: PerformanceMetrics,
}

impl BacktestResult {
    /// Mean daily turnover.
    pub fn avg_turnover(&self) -> f64 {
        let values = self.turnover.values();
        if values.is_empty() {
            0.0
        } else {
            values.iter().sum::<f64>() / values.len() as f64
        }
    }

    /// Sum of daily costs.
    pub fn total_cost(&self) -> f64 {
        self.costs.values().iter().sum()
    }

    /// Daily frame with `date`, `equity`, `net_return`, `turnover` and `cost`.
    pub fn equity_frame(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new("date".into(), self.equity_curve.dates()).into(),
            Series::new("equity".into(), self.equity_curve.values()).into(),
            Series::new("net_return".into(), self.net_returns.values()).into(),
            Series::new("turnover".into(), self.turnover.values()).into(),
            Series::new("cost".into(), self.costs.values()).into(),
        ])?;
        Ok(df)
    }
}

/// Backtesting engine.
#[derive(Debug, Clone, Default)]
pub struct Backtest {
    config: Config,
}

impl Backtest {
    /// Create a new backtest for a validated run configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use ronda_eval::Backtest;
    /// use ronda_traits::Config;
    ///
    /// let backtest = Backtest::new(Config::default());
    /// let result = backtest.run(&inputs, start, end)?;
    /// println!("Sharpe Ratio: {:.2}", result.metrics.sharpe);
    /// ```
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Run the simulation.
    ///
    /// `inputs` should start early enough to warm up the longest rolling
    /// window before `start`. The master date index is the close-price
    /// index of `inputs.ohlcv`.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::NoData`] if there are no prices or no trading
    /// days inside `[start, end]`, and propagates signal errors.
    pub fn run(&self, inputs: &MarketInputs<'_>, start: Date, end: Date) -> Result<BacktestResult> {
        if inputs.ohlcv.is_empty() {
            return Err(RondaError::NoData("no market data for backtest".to_string()));
        }

        let closes = inputs.ohlcv.closes();
        let dates = closes.dates().to_vec();
        let symbols: Vec<Symbol> = closes.symbols().cloned().collect();

        let first = dates.partition_point(|d| *d < start);
        let last = dates.partition_point(|d| *d <= end);
        if first >= last {
            return Err(RondaError::NoData(format!(
                "no trading days between {start} and {end}"
            )));
        }
        let warmup = self.config.windows.max_window();
        if first < warmup {
            warn!(
                available = first,
                required = warmup,
                "warm-up shorter than the longest rolling window"
            );
        }
        info!(
            %start,
            %end,
            tickers = symbols.len(),
            days = last - first,
            "running backtest"
        );

        let mut streams: Vec<(SignalKind, Array2<f64>)> = Vec::with_capacity(4);
        for signal in build_signals(&self.config) {
            let series = signal.series(inputs)?;
            debug!(signal = signal.name(), "signal series computed");
            streams.push((signal.kind(), series.to_matrix(&dates, &symbols)));
        }
        let scores = CompositeScorer::new(self.config.weights).score_matrix(&streams)?;

        let targets = hold_targets(&scores, &self.config.actions);
        let weights = size_positions(&targets, &self.config.risk);

        let mut close_matrix = Array2::from_elem((dates.len(), symbols.len()), f64::NAN);
        for (j, symbol) in symbols.iter().enumerate() {
            if let Some(column) = closes.column(symbol) {
                close_matrix
                    .column_mut(j)
                    .assign(&Array1::from_vec(column.to_vec()));
            }
        }
        let gross = portfolio_returns(&weights, &asset_returns(&close_matrix));
        let turnover = turnover(&weights);
        let costs = turnover.mapv(|t| t * self.config.costs.rate());
        let net = &gross - &costs;

        let range = first..last;
        let range_dates = dates[range.clone()].to_vec();
        let slice = |values: &Array1<f64>| values.slice(ndarray::s![first..last]).to_vec();

        let mut equity = Vec::with_capacity(range.len());
        let mut level = 1.0;
        for r in net.slice(ndarray::s![first..last]) {
            level *= 1.0 + r;
            equity.push(level);
        }

        let equity_curve = TimeSeries::new(range_dates.clone(), equity)?;
        let metrics = PerformanceMetrics::from_equity(&equity_curve);
        let result = BacktestResult {
            net_returns: TimeSeries::new(range_dates.clone(), slice(&net))?,
            turnover: TimeSeries::new(range_dates.clone(), slice(&turnover))?,
            costs: TimeSeries::new(range_dates.clone(), slice(&costs))?,
            weights: DatedMatrix::new(
                range_dates.clone(),
                symbols.clone(),
                weights.select(Axis(0), &range.clone().collect::<Vec<_>>()),
            )?,
            scores: DatedMatrix::new(
                range_dates,
                symbols,
                scores.select(Axis(0), &range.collect::<Vec<_>>()),
            )?,
            equity_curve,
            metrics,
        };

        info!(
            total_return = metrics.total_return,
            sharpe = metrics.sharpe,
            max_drawdown = metrics.max_drawdown,
            avg_turnover = result.avg_turnover(),
            total_cost = result.total_cost(),
            "backtest complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Datelike, Duration, Weekday};
    use ronda_traits::config::{ActionConfig, WeightConfig};
    use ronda_traits::{OhlcvColumns, OhlcvPanel, PriceMatrix, StressScaling};
    use std::collections::BTreeMap;

    const DAYS: usize = 300;
    const SHOCK: usize = 150;

    fn business_days(n: usize) -> Vec<Date> {
        let mut out = Vec::with_capacity(n);
        let mut date = Date::from_ymd_opt(2022, 1, 3).unwrap();
        while out.len() < n {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                out.push(date);
            }
            date += Duration::days(1);
        }
        out
    }

    fn wiggle(i: usize) -> f64 {
        ((i * 7919) % 101) as f64 / 50.0 - 1.0
    }

    fn bars(closes: Vec<f64>) -> OhlcvColumns {
        OhlcvColumns {
            open: closes.clone(),
            high: closes.iter().map(|c| c * 1.01).collect(),
            low: closes.iter().map(|c| c * 0.99).collect(),
            volume: (0..closes.len())
                .map(|i| 1_000_000.0 + 10_000.0 * wiggle(i + 11))
                .collect(),
            close: closes,
        }
    }

    struct Fixture {
        ohlcv: OhlcvPanel,
        reference: PriceMatrix,
        credit: PriceMatrix,
        vix: TimeSeries,
    }

    impl Fixture {
        /// Two tickers tracking their references with a small premium, and
        /// a sharp discount on A at `SHOCK`.
        fn new(last_close_a: Option<f64>) -> Self {
            let dates = business_days(DAYS);
            let ref_a: Vec<f64> = (0..DAYS).map(|i| 100.0 + 0.1 * i as f64).collect();
            let ref_b: Vec<f64> = (0..DAYS).map(|i| 50.0 + 0.05 * i as f64).collect();
            let mut close_a: Vec<f64> = ref_a
                .iter()
                .enumerate()
                .map(|(i, r)| r * (1.0 + 0.001 * wiggle(i)))
                .collect();
            close_a[SHOCK] = ref_a[SHOCK] * (1.0 - 0.02);
            if let Some(close) = last_close_a {
                close_a[DAYS - 1] = close;
            }
            let close_b: Vec<f64> = ref_b
                .iter()
                .enumerate()
                .map(|(i, r)| r * (1.0 + 0.001 * wiggle(i + 3)))
                .collect();

            let mut panel = BTreeMap::new();
            panel.insert("AAA".to_string(), bars(close_a));
            panel.insert("BBB".to_string(), bars(close_b));
            let mut references = BTreeMap::new();
            references.insert("AAA".to_string(), ref_a);
            references.insert("BBB".to_string(), ref_b);

            Self {
                ohlcv: OhlcvPanel::new(dates.clone(), panel).unwrap(),
                reference: PriceMatrix::new(dates, references).unwrap(),
                credit: PriceMatrix::default(),
                vix: TimeSeries::default(),
            }
        }

        fn inputs(&self) -> MarketInputs<'_> {
            MarketInputs {
                ohlcv: &self.ohlcv,
                reference: &self.reference,
                credit: &self.credit,
                vix: &self.vix,
            }
        }

        fn dates(&self) -> &[Date] {
            self.ohlcv.dates()
        }
    }

    /// Premium/discount only, with thresholds wide enough that ordinary
    /// noise never trades.
    fn config() -> Config {
        Config {
            weights: WeightConfig {
                premdisc: 1.0,
                divergence: 0.0,
                volume: 0.0,
                cross_asset: 0.0,
                stress_scaling: StressScaling::RawCount,
            },
            actions: ActionConfig {
                buy: -2.5,
                sell: 2.5,
            },
            ..Config::default()
        }
    }

    fn run_full(fixture: &Fixture, config: Config) -> BacktestResult {
        let dates = fixture.dates();
        Backtest::new(config)
            .run(&fixture.inputs(), dates[0], dates[DAYS - 1])
            .unwrap()
    }

    #[test]
    fn test_round_trip_discount_opens_position() {
        let fixture = Fixture::new(None);
        let result = run_full(&fixture, config());

        let a = result.weights.column("AAA").unwrap();
        let b = result.weights.column("BBB").unwrap();
        assert!(a.iter().take(SHOCK).all(|w| *w == 0.0));
        assert!(a.iter().skip(SHOCK).all(|w| (*w - 0.08).abs() < 1e-12));
        assert!(b.iter().all(|w| *w == 0.0));

        let rate = Config::default().costs.rate();
        let net = result.net_returns.values();
        assert!(net.iter().take(SHOCK).all(|r| *r == 0.0));
        assert_relative_eq!(net[SHOCK], -0.08 * rate, epsilon = 1e-15);

        let closes = fixture.ohlcv.bars("AAA").unwrap().close.clone();
        let day_after = closes[SHOCK + 1] / closes[SHOCK] - 1.0;
        assert_relative_eq!(net[SHOCK + 1], 0.08 * day_after, epsilon = 1e-12);
        assert_relative_eq!(result.turnover.values()[SHOCK], 0.08, epsilon = 1e-12);
        assert_relative_eq!(result.total_cost(), 0.08 * rate, epsilon = 1e-15);
    }

    #[test]
    fn test_equity_is_cumulative_product() {
        let fixture = Fixture::new(None);
        let result = run_full(&fixture, config());
        let mut level = 1.0;
        for (net, equity) in result
            .net_returns
            .values()
            .iter()
            .zip(result.equity_curve.values())
        {
            level *= 1.0 + net;
            assert_relative_eq!(*equity, level, epsilon = 1e-12);
        }
        assert_relative_eq!(
            result.metrics.total_return,
            level - 1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_range_trims_warmup() {
        let fixture = Fixture::new(None);
        let dates = fixture.dates();
        let start = dates[200];
        let result = Backtest::new(config())
            .run(&fixture.inputs(), start, dates[DAYS - 1])
            .unwrap();

        assert_eq!(result.equity_curve.len(), DAYS - 200);
        assert_eq!(result.equity_curve.dates()[0], start);
        assert_eq!(result.weights.dates()[0], start);
        assert_eq!(result.scores.dates().len(), DAYS - 200);
        // Position opened during warm-up is still held.
        assert_relative_eq!(result.weights.get(start, "AAA").unwrap(), 0.08);
    }

    #[test]
    fn test_no_look_ahead() {
        let base = run_full(&Fixture::new(None), config());
        let shocked = run_full(&Fixture::new(Some(1.0)), config());

        let n = DAYS - 1;
        assert_eq!(
            base.net_returns.values()[..n],
            shocked.net_returns.values()[..n]
        );
        assert_eq!(
            base.weights.values().slice(ndarray::s![..n, ..]),
            shocked.weights.values().slice(ndarray::s![..n, ..])
        );
        assert_ne!(base.net_returns.values()[n], shocked.net_returns.values()[n]);
    }

    #[test]
    fn test_deterministic() {
        let fixture = Fixture::new(None);
        let first = run_full(&fixture, Config::default());
        let second = run_full(&fixture, Config::default());
        assert_eq!(first.equity_curve, second.equity_curve);
        assert_eq!(first.metrics, second.metrics);
    }

    #[test]
    fn test_bucket_cap_holds_in_full_run() {
        let fixture = Fixture::new(None);
        let mut config = Config::default();
        config.actions = ActionConfig {
            buy: 10.0,
            sell: 20.0,
        };
        config.risk.bucket_cap = 0.1;
        let result = run_full(&fixture, config);
        for row in result.weights.values().axis_iter(Axis(0)) {
            assert!(row.sum() <= 0.1 + 1e-12);
        }
        assert_relative_eq!(result.weights.values()[[0, 0]], 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_inputs() {
        let ohlcv = OhlcvPanel::default();
        let reference = PriceMatrix::default();
        let credit = PriceMatrix::default();
        let vix = TimeSeries::default();
        let inputs = MarketInputs {
            ohlcv: &ohlcv,
            reference: &reference,
            credit: &credit,
            vix: &vix,
        };
        let day = Date::from_ymd_opt(2024, 1, 2).unwrap();
        let err = Backtest::default().run(&inputs, day, day).unwrap_err();
        assert!(matches!(err, RondaError::NoData(_)));
    }

    #[test]
    fn test_range_outside_data() {
        let fixture = Fixture::new(None);
        let later = fixture.dates()[DAYS - 1] + Duration::days(30);
        let err = Backtest::new(config())
            .run(&fixture.inputs(), later, later + Duration::days(10))
            .unwrap_err();
        assert!(matches!(err, RondaError::NoData(_)));
    }

    #[test]
    fn test_equity_frame_columns() {
        let result = run_full(&Fixture::new(None), config());
        let df = result.equity_frame().unwrap();
        assert_eq!(df.height(), DAYS);
        assert_eq!(
            df.get_column_names_str(),
            ["date", "equity", "net_return", "turnover", "cost"]
        );
    }
}
