//! Backtest command implementation.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use polars::prelude::*;
use ronda::{Backtest, BacktestResult, Config, Date};
use serde_json::json;
use tracing::info;

use crate::OutputFormat;
use crate::data;

const EQUITY_FILE: &str = "equity_curve.csv";
const SUMMARY_FILE: &str = "backtest_summary.md";

/// Run the backtest over `[start, end]` and write its reports.
pub(crate) async fn run_backtest(
    config: Config,
    start: &str,
    end: &str,
    format: OutputFormat,
) -> Result<()> {
    let start_date = data::parse_date(start)?;
    let end_date = data::parse_date(end)?;
    if start_date > end_date {
        bail!("start date {start_date} is after end date {end_date}");
    }

    let snapshot = data::load_snapshot(&config, start_date, end_date).await?;
    let out_dir = config.reporting.out_dir.clone();
    let result = Backtest::new(config)
        .run(&snapshot.inputs(), start_date, end_date)
        .context("running backtest")?;

    let (equity_path, summary_path) = write_reports(&result, &out_dir, start_date, end_date)?;

    match format {
        OutputFormat::Json => {
            let value = json!({
                "start": start_date,
                "end": end_date,
                "metrics": result.metrics,
                "avg_turnover": result.avg_turnover(),
                "total_cost": result.total_cost(),
                "equity_curve": equity_path,
                "summary": summary_path,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            println!("\nBacktest {start_date} to {end_date}");
            println!("{}", "-".repeat(40));
            for (name, value) in result.metrics.entries() {
                println!("  {name:15} {value:>10.4}");
            }
            println!("  {:15} {:>10.4}", "Avg Turnover", result.avg_turnover());
            println!("  {:15} {:>10.4}", "Total Cost", result.total_cost());
            println!();
            println!("Equity curve: {}", equity_path.display());
            println!("Summary:      {}\n", summary_path.display());
        }
    }
    Ok(())
}

fn write_reports(
    result: &BacktestResult,
    out_dir: &Path,
    start: Date,
    end: Date,
) -> Result<(PathBuf, PathBuf)> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating report directory {}", out_dir.display()))?;

    let equity_path = out_dir.join(EQUITY_FILE);
    let mut file = File::create(&equity_path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut result.equity_frame()?)?;

    let summary_path = out_dir.join(SUMMARY_FILE);
    fs::write(&summary_path, summary_markdown(result, start, end))?;

    info!(
        equity = %equity_path.display(),
        summary = %summary_path.display(),
        "backtest reports written"
    );
    Ok((equity_path, summary_path))
}

/// Markdown report with the metrics table.
fn summary_markdown(result: &BacktestResult, start: Date, end: Date) -> String {
    let mut lines = vec![
        "# Backtest Summary".to_string(),
        String::new(),
        format!("Period: {start} to {end}"),
        String::new(),
        "## Performance Metrics".to_string(),
        String::new(),
        "| Metric | Value |".to_string(),
        "|---|---|".to_string(),
    ];
    lines.extend(
        result
            .metrics
            .entries()
            .iter()
            .map(|(name, value)| format!("| {name} | {value:.4} |")),
    );
    lines.push(format!("| Avg Turnover | {:.4} |", result.avg_turnover()));
    lines.push(format!("| Total Cost | {:.4} |", result.total_cost()));
    lines.push(String::new());
    lines.push("## Equity Curve".to_string());
    lines.push(String::new());
    lines.push(format!("See `{EQUITY_FILE}`."));

    let mut md = lines.join("\n");
    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use ronda::{PerformanceMetrics, TimeSeries};
    use ronda::traits::DatedMatrix;

    fn result() -> BacktestResult {
        let dates: Vec<Date> = (1..=3)
            .map(|d| Date::from_ymd_opt(2024, 1, d).unwrap())
            .collect();
        let series = |values: Vec<f64>| TimeSeries::new(dates.clone(), values).unwrap();
        BacktestResult {
            equity_curve: series(vec![1.0, 1.01, 1.02]),
            net_returns: series(vec![0.0, 0.01, 0.0099]),
            turnover: series(vec![0.0, 0.08, 0.0]),
            costs: series(vec![0.0, 0.00004, 0.0]),
            weights: DatedMatrix::default(),
            scores: DatedMatrix::default(),
            metrics: PerformanceMetrics {
                total_return: 0.02,
                sharpe: 1.5,
                ..PerformanceMetrics::default()
            },
        }
    }

    #[test]
    fn test_summary_has_metric_table() {
        let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
        let end = Date::from_ymd_opt(2024, 1, 3).unwrap();
        let md = summary_markdown(&result(), start, end);
        assert!(md.contains("| Metric | Value |"));
        assert!(md.contains("| Total Return | 0.0200 |"));
        assert!(md.contains("| Sharpe | 1.5000 |"));
        assert!(md.contains("| Total Cost | 0.0000 |"));
        assert!(md.contains("Period: 2024-01-01 to 2024-01-03"));
        assert!(md.starts_with("# Backtest Summary\n\nPeriod: "));
        assert!(md.contains("|---|---|\n| Total Return |"));
        assert!(md.ends_with("## Equity Curve\n\nSee `equity_curve.csv`.\n"));
    }

    #[test]
    fn test_write_reports() {
        let dir = std::env::temp_dir().join(format!("ronda-cli-backtest-{}", std::process::id()));
        let start = Date::from_ymd_opt(2024, 1, 1).unwrap();
        let end = Date::from_ymd_opt(2024, 1, 3).unwrap();
        let (equity, summary) = write_reports(&result(), &dir, start, end).unwrap();

        let csv = fs::read_to_string(equity).unwrap();
        assert!(csv.starts_with("date,equity,net_return,turnover,cost"));
        assert_eq!(csv.lines().count(), 4);
        assert!(fs::read_to_string(summary).unwrap().contains("Max Drawdown"));

        let _ = fs::remove_dir_all(dir);
    }
}
