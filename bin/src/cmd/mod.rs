//! CLI subcommand modules.

pub(crate) mod backtest;
pub(crate) mod monitor;
pub(crate) mod signals;
