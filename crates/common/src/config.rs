//! Engine configuration types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::StrategyMode;

/// Smallest lineup the payout table supports.
pub const MIN_LEGS: usize = 2;
/// Largest lineup the payout table supports.
pub const MAX_LEGS: usize = 6;

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Opportunity generation parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Lineup selection parameters.
    #[serde(default)]
    pub strategy: StrategyConfig,

    /// Risk-profile bounds.
    #[serde(default)]
    pub risk: RiskConfig,

    /// Payout multiplier table.
    #[serde(default)]
    pub payout: PayoutConfig,

    /// Refresh and timeout parameters.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Where subjects come from.
    #[serde(default)]
    pub data: DataConfig,
}

/// One stat market offered for a sport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatLine {
    /// Market name, e.g. "Rebounds".
    pub market: String,
    /// Typical line before recent-form adjustment.
    pub base_line: f64,
}

impl StatLine {
    pub fn new(market: impl Into<String>, base_line: f64) -> Self {
        Self {
            market: market.into(),
            base_line,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Per-sport stat lists replacing the built-in table for that sport.
    #[serde(default)]
    pub stat_overrides: BTreeMap<String, Vec<StatLine>>,

    /// Decimal odds assumed for a single leg (Kelly input).
    #[serde(default = "default_decimal_odds")]
    pub decimal_odds: f64,

    /// Fractional-Kelly multiplier applied to the full Kelly stake.
    #[serde(default = "default_kelly_multiplier")]
    pub kelly_multiplier: f64,

    /// Seed for the stand-in prediction model. None = seed from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub mode: StrategyMode,

    /// Number of legs to select (2–6).
    #[serde(default = "default_target_legs")]
    pub target_legs: usize,

    /// Pairwise correlation must stay strictly below this.
    #[serde(default = "default_correlation_limit")]
    pub correlation_limit: f64,

    /// Minimum leg confidence in percent.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Max legs drawn from one team.
    #[serde(default = "default_max_same_team")]
    pub max_same_team: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Legs with a historical drawdown above this are skipped.
    #[serde(default = "default_max_drawdown")]
    pub max_drawdown: f64,

    /// Largest stake accepted for one entry.
    #[serde(default = "default_max_exposure")]
    pub max_exposure: f64,

    /// Stake used when none is given.
    #[serde(default = "default_stake")]
    pub default_stake: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutTier {
    pub legs: usize,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoutConfig {
    #[serde(default = "default_payout_tiers")]
    pub tiers: Vec<PayoutTier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Interval between refresh cycles.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Upper bound on a single data-source fetch.
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    #[default]
    Synthetic,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default)]
    pub source: DataSourceKind,

    /// JSON subject file, required when `source = "file"`.
    #[serde(default)]
    pub path: Option<String>,

    /// Subjects emitted per cycle by the synthetic source.
    #[serde(default = "default_synthetic_subjects")]
    pub synthetic_subjects: usize,
}

// ── Defaults ──────────────────────────────────────────────────────────

fn default_decimal_odds() -> f64 {
    1.909
}
fn default_kelly_multiplier() -> f64 {
    0.25
}

fn default_target_legs() -> usize {
    3
}
fn default_correlation_limit() -> f64 {
    0.7
}
fn default_min_confidence() -> f64 {
    50.0
}
fn default_max_same_team() -> usize {
    2
}

fn default_max_drawdown() -> f64 {
    0.25
}
fn default_max_exposure() -> f64 {
    100.0
}
fn default_stake() -> f64 {
    10.0
}

fn default_payout_tiers() -> Vec<PayoutTier> {
    [(2, 3.0), (3, 5.0), (4, 10.0), (5, 20.0), (6, 50.0)]
        .into_iter()
        .map(|(legs, multiplier)| PayoutTier { legs, multiplier })
        .collect()
}

fn default_refresh_interval() -> u64 {
    30
}
fn default_fetch_timeout() -> u64 {
    5_000
}

fn default_synthetic_subjects() -> usize {
    12
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            stat_overrides: BTreeMap::new(),
            decimal_odds: default_decimal_odds(),
            kelly_multiplier: default_kelly_multiplier(),
            seed: None,
        }
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            mode: StrategyMode::default(),
            target_legs: default_target_legs(),
            correlation_limit: default_correlation_limit(),
            min_confidence: default_min_confidence(),
            max_same_team: default_max_same_team(),
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_drawdown: default_max_drawdown(),
            max_exposure: default_max_exposure(),
            default_stake: default_stake(),
        }
    }
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            tiers: default_payout_tiers(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
            fetch_timeout_ms: default_fetch_timeout(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            source: DataSourceKind::default(),
            path: None,
            synthetic_subjects: default_synthetic_subjects(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            strategy: StrategyConfig::default(),
            risk: RiskConfig::default(),
            payout: PayoutConfig::default(),
            timing: TimingConfig::default(),
            data: DataConfig::default(),
        }
    }
}
