//! Engine configuration.
//!
//! One [`Config`] value carries every tunable of a run. Each section is
//! independently defaulted, so a TOML file only needs to name the fields it
//! changes:
//!
//! ```toml
//! [weights]
//! premdisc = 0.5
//!
//! [weights.stress_scaling]
//! mode = "saturating"
//! level = 2.0
//! ```
//!
//! The configuration is built once (defaults, then file, then command-line
//! overrides), validated, and treated as immutable afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Result, RondaError};

/// Complete configuration for a monitor or backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tradable universe selection.
    pub universe: UniverseConfig,
    /// Rolling window lengths, in observations.
    pub windows: WindowConfig,
    /// Trigger thresholds.
    pub thresholds: ThresholdConfig,
    /// Composite score weights.
    pub weights: WeightConfig,
    /// Score to action thresholds.
    pub actions: ActionConfig,
    /// Position sizing caps.
    pub risk: RiskConfig,
    /// Transaction cost assumptions.
    pub costs: CostConfig,
    /// Data locations and fetch buffer.
    pub data: DataConfig,
    /// Report output.
    pub reporting: ReportingConfig,
}

impl Config {
    /// Parse a TOML document, filling unspecified fields with defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| RondaError::InvalidConfig(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|e| match e {
            RondaError::InvalidConfig(msg) => {
                RondaError::InvalidConfig(format!("{}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Check every section for values the engine cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::InvalidConfig`] for windows shorter than 2,
    /// negative or non-finite weights, caps outside (0, 1], negative cost
    /// basis points, NaN action thresholds, or a negative warm-up.
    pub fn validate(&self) -> Result<()> {
        for (name, window) in self.windows.entries() {
            if window < 2 {
                return Err(RondaError::InvalidConfig(format!(
                    "windows.{name} must be at least 2, got {window}"
                )));
            }
        }

        for (name, weight) in self.weights.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RondaError::InvalidConfig(format!(
                    "weights.{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        if let StressScaling::Saturating { level } = self.weights.stress_scaling {
            if !level.is_finite() || level < 0.0 {
                return Err(RondaError::InvalidConfig(format!(
                    "weights.stress_scaling.level must be non-negative, got {level}"
                )));
            }
        }

        for (name, cap) in [
            ("per_pos_cap", self.risk.per_pos_cap),
            ("bucket_cap", self.risk.bucket_cap),
        ] {
            if cap == 0.0 || !(0.0..=1.0).contains(&cap) {
                return Err(RondaError::InvalidConfig(format!(
                    "risk.{name} must be in (0, 1], got {cap}"
                )));
            }
        }

        for (name, bps) in [
            ("tx_bps", self.costs.tx_bps),
            ("slippage_bps", self.costs.slippage_bps),
        ] {
            if !bps.is_finite() || bps < 0.0 {
                return Err(RondaError::InvalidConfig(format!(
                    "costs.{name} must be non-negative, got {bps}"
                )));
            }
        }

        for (name, threshold) in [("buy", self.actions.buy), ("sell", self.actions.sell)] {
            if threshold.is_nan() {
                return Err(RondaError::InvalidConfig(format!(
                    "actions.{name} must be a number"
                )));
            }
        }

        if self.data.warmup_days < 0 {
            return Err(RondaError::InvalidConfig(format!(
                "data.warmup_days must be non-negative, got {}",
                self.data.warmup_days
            )));
        }

        Ok(())
    }

    /// Calendar days to fetch before a run's start.
    ///
    /// At least `data.warmup_days`, widened so the longest rolling window
    /// (in trading days) is full by the start date.
    #[must_use]
    pub fn warmup_calendar_days(&self) -> i64 {
        let window = self.windows.max_window() as f64;
        let needed = (window * CALENDAR_DAYS_PER_TRADING_DAY).ceil() as i64 + WARMUP_MARGIN_DAYS;
        self.data.warmup_days.max(needed)
    }
}

/// Calendar days spanned by one trading day on average.
const CALENDAR_DAYS_PER_TRADING_DAY: f64 = 365.25 / 252.0;

/// Extra calendar days covering holiday clusters.
const WARMUP_MARGIN_DAYS: i64 = 14;

/// Tradable universe selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Name of the universe file to use.
    pub profile: String,
    /// Universe CSV files by profile name.
    pub files: BTreeMap<String, PathBuf>,
    /// Regular expressions; matching tickers are excluded.
    pub exclude_patterns: Vec<String>,
    /// Tickers kept even when an exclude pattern matches.
    pub allowlist: Vec<String>,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        let mut files = BTreeMap::new();
        files.insert(
            "vanguard_core".to_string(),
            PathBuf::from("config/universe_vanguard_core.csv"),
        );
        Self {
            profile: "vanguard_core".to_string(),
            files,
            exclude_patterns: Vec::new(),
            allowlist: Vec::new(),
        }
    }
}

impl UniverseConfig {
    /// Path of the selected profile's universe file.
    pub fn profile_path(&self) -> Result<&Path> {
        self.files
            .get(&self.profile)
            .map(PathBuf::as_path)
            .ok_or_else(|| {
                RondaError::InvalidConfig(format!(
                    "universe profile '{}' not found in universe.files",
                    self.profile
                ))
            })
    }
}

/// Rolling window lengths, in observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Premium/discount z-score window.
    pub premdisc: usize,
    /// Divergence z-score window.
    pub divergence: usize,
    /// Volume z-score window.
    pub volume: usize,
    /// Intraday range z-score window.
    pub range: usize,
    /// IG OAS and VIX z-score window.
    pub stress: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            premdisc: 126,
            divergence: 126,
            volume: 20,
            range: 60,
            stress: 126,
        }
    }
}

impl WindowConfig {
    fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("premdisc", self.premdisc),
            ("divergence", self.divergence),
            ("volume", self.volume),
            ("range", self.range),
            ("stress", self.stress),
        ]
    }

    /// The longest window, i.e. the minimum useful warm-up in observations.
    pub fn max_window(&self) -> usize {
        self.entries().iter().map(|(_, w)| *w).max().unwrap_or(0)
    }
}

/// Trigger thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Premium/discount |z| threshold.
    pub premdisc_z: f64,
    /// Divergence |z| threshold.
    pub divergence_z: f64,
    /// Volume |z| threshold.
    pub volume_z: f64,
    /// Intraday range |z| threshold.
    pub range_z: f64,
    /// IG OAS level z threshold.
    pub stress_z: f64,
    /// VIX level z threshold.
    pub vix_z: f64,
    /// Day-over-day OAS widening threshold, in basis points.
    pub oas_jump_bps: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            premdisc_z: 2.0,
            divergence_z: 2.0,
            volume_z: 2.0,
            range_z: 2.0,
            stress_z: 2.0,
            vix_z: 2.0,
            oas_jump_bps: 15.0,
        }
    }
}

/// How the stress intensity (0-3) becomes the composite stress term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum StressScaling {
    /// Use the number of firing tests directly.
    #[default]
    RawCount,
    /// Use `level` whenever at least one test fires.
    Saturating {
        /// Stress term when any test fires.
        #[serde(default = "default_saturating_level")]
        level: f64,
    },
}

const fn default_saturating_level() -> f64 {
    2.0
}

impl StressScaling {
    /// Map an intensity to the stress term. Non-finite intensity maps to 0.
    #[must_use]
    pub fn apply(&self, intensity: f64) -> f64 {
        if !intensity.is_finite() {
            return 0.0;
        }
        match self {
            Self::RawCount => intensity,
            Self::Saturating { level } => {
                if intensity >= 1.0 {
                    *level
                } else {
                    0.0
                }
            }
        }
    }
}

/// Composite score weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
    /// Premium/discount weight.
    pub premdisc: f64,
    /// Divergence weight.
    pub divergence: f64,
    /// Volume weight (subtracted).
    pub volume: f64,
    /// Cross-asset stress weight (subtracted).
    pub cross_asset: f64,
    /// Stress intensity scaling.
    pub stress_scaling: StressScaling,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            premdisc: 0.35,
            divergence: 0.30,
            volume: 0.25,
            cross_asset: 0.10,
            stress_scaling: StressScaling::RawCount,
        }
    }
}

impl WeightConfig {
    fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("premdisc", self.premdisc),
            ("divergence", self.divergence),
            ("volume", self.volume),
            ("cross_asset", self.cross_asset),
        ]
    }
}

/// Score to action thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Scores at or below this are BUY.
    pub buy: f64,
    /// Scores at or above this are SELL.
    pub sell: f64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            buy: -0.8,
            sell: 0.8,
        }
    }
}

/// Position sizing caps, as fractions of capital.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Weight of one held position.
    pub per_pos_cap: f64,
    /// Maximum aggregate exposure on any day.
    pub bucket_cap: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            per_pos_cap: 0.08,
            bucket_cap: 0.40,
        }
    }
}

/// Transaction cost assumptions, in basis points of turnover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    /// Commission and fees.
    pub tx_bps: f64,
    /// Slippage.
    pub slippage_bps: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            tx_bps: 2.0,
            slippage_bps: 3.0,
        }
    }
}

impl CostConfig {
    /// Total cost per unit of turnover, as a fraction.
    #[must_use]
    pub fn rate(&self) -> f64 {
        (self.tx_bps + self.slippage_bps) / 10_000.0
    }
}

/// Data locations and fetch buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `<TICKER>.csv` price files.
    pub cache_dir: PathBuf,
    /// Calendar days fetched before the requested start for warm-up.
    pub warmup_days: i64,
    /// Ticker of the volatility index.
    pub vix_symbol: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("data/cache"),
            warmup_days: 200,
            vix_symbol: "^VIX".to_string(),
        }
    }
}

/// Report output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportingConfig {
    /// Directory that receives recommendation CSVs and backtest reports.
    pub out_dir: PathBuf,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("reports"),
        }
    }
}
