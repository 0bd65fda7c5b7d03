//! Monitor command implementation.

use anyhow::{Context, Result};
use chrono::Local;
use ronda::{Config, Monitor, MonitorReport};
use serde_json::json;

use crate::OutputFormat;
use crate::data;

/// Rows shown in the text summary.
const TOP_ROWS: usize = 10;

/// Score the universe as of `date` and report the actionable tickers.
pub(crate) async fn run_monitor(
    config: Config,
    date: Option<&str>,
    save: bool,
    format: OutputFormat,
) -> Result<()> {
    let as_of = match date {
        Some(date) => data::parse_date(date)?,
        None => Local::now().date_naive(),
    };
    let snapshot = data::load_snapshot(&config, as_of, as_of).await?;

    let out_dir = config.reporting.out_dir.clone();
    let report = Monitor::new(config)
        .run(&snapshot.inputs())
        .context("running monitor")?;

    let saved = if save {
        Some(report.write_csv(&out_dir)?)
    } else {
        None
    };

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_text(&report),
    }
    if let Some(path) = saved {
        eprintln!("Recommendations saved to {}", path.display());
    }
    Ok(())
}

fn print_json(report: &MonitorReport) -> Result<()> {
    let value = json!({
        "as_of": report.as_of,
        "rows": report.rows,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_text(report: &MonitorReport) {
    let as_of = report
        .as_of
        .map_or_else(|| "n/a".to_string(), |d| d.to_string());
    println!("\nRecommendations as of {as_of}");
    println!("{}", "-".repeat(60));

    let actionable: Vec<_> = report.actionable().take(TOP_ROWS).collect();
    if actionable.is_empty() {
        println!("  No actionable signals ({} tickers on HOLD)", report.rows.len());
    }
    for row in actionable {
        println!(
            "  {:6} {:5} {:>7.2}  {}",
            row.ticker,
            row.action.as_str(),
            row.score,
            row.rationale
        );
    }
    println!();
}
