//! Run configuration: defaults, then the TOML file, then command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ronda::Config;
use tracing::debug;

/// Flags that override individual configuration fields.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct ConfigOverrides {
    /// Universe profile name
    #[arg(long, global = true)]
    pub(crate) profile: Option<String>,

    /// Directory of cached price files
    #[arg(long, global = true)]
    pub(crate) cache_dir: Option<PathBuf>,

    /// Directory for reports
    #[arg(long, global = true)]
    pub(crate) out_dir: Option<PathBuf>,

    /// Composite score at or below which to BUY
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub(crate) buy: Option<f64>,

    /// Composite score at or above which to SELL
    #[arg(long, global = true, allow_negative_numbers = true)]
    pub(crate) sell: Option<f64>,

    /// Weight of one held position
    #[arg(long, global = true)]
    pub(crate) per_pos_cap: Option<f64>,

    /// Cap on total gross exposure
    #[arg(long, global = true)]
    pub(crate) bucket_cap: Option<f64>,

    /// Commission in basis points of turnover
    #[arg(long, global = true)]
    pub(crate) tx_bps: Option<f64>,

    /// Slippage in basis points of turnover
    #[arg(long, global = true)]
    pub(crate) slippage_bps: Option<f64>,
}

impl ConfigOverrides {
    /// Write every set flag into `config`.
    pub(crate) fn apply(&self, config: &mut Config) {
        if let Some(profile) = &self.profile {
            config.universe.profile.clone_from(profile);
        }
        if let Some(dir) = &self.cache_dir {
            config.data.cache_dir.clone_from(dir);
        }
        if let Some(dir) = &self.out_dir {
            config.reporting.out_dir.clone_from(dir);
        }
        if let Some(buy) = self.buy {
            config.actions.buy = buy;
        }
        if let Some(sell) = self.sell {
            config.actions.sell = sell;
        }
        if let Some(cap) = self.per_pos_cap {
            config.risk.per_pos_cap = cap;
        }
        if let Some(cap) = self.bucket_cap {
            config.risk.bucket_cap = cap;
        }
        if let Some(bps) = self.tx_bps {
            config.costs.tx_bps = bps;
        }
        if let Some(bps) = self.slippage_bps {
            config.costs.slippage_bps = bps;
        }
    }
}

/// Build the validated configuration for one run.
pub(crate) fn load(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("invalid configuration")?;
    debug!(?config, "configuration loaded");
    Ok(config)
}
