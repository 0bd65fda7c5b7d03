//! ronda CLI binary.
//!
//! Runs the dislocation monitor and the historical backtest from the
//! command line.

mod cmd;
mod config;
mod data;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigOverrides;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "ETF pricing-dislocation monitor and backtester", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the universe on the latest available day
    Monitor {
        /// As-of date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Do not write the recommendations CSV
        #[arg(long)]
        no_save: bool,
    },

    /// Replay the strategy over a date range
    Backtest {
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },

    /// List available signals
    Signals {
        /// Show detailed information
        #[arg(long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Signals { detailed } => {
            cmd::signals::list_signals(detailed, cli.format)?;
        }
        Commands::Monitor { date, no_save } => {
            let config = config::load(cli.config.as_deref(), &cli.overrides)?;
            cmd::monitor::run_monitor(config, date.as_deref(), !no_save, cli.format).await?;
        }
        Commands::Backtest { start, end } => {
            let config = config::load(cli.config.as_deref(), &cli.overrides)?;
            cmd::backtest::run_backtest(config, &start, &end, cli.format).await?;
        }
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
