//! Domain types shared across the lineup engine.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Confidence scale ──────────────────────────────────────────────────

/// Lowest meaningful confidence, in percent.
pub const CONFIDENCE_MIN: f64 = 50.0;
/// Highest meaningful confidence, in percent.
pub const CONFIDENCE_MAX: f64 = 98.0;

/// Clip a percent-scale confidence into the meaningful band.
/// Non-finite input collapses to the floor.
pub fn clamp_confidence(pct: f64) -> f64 {
    if !pct.is_finite() {
        return CONFIDENCE_MIN;
    }
    pct.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

/// Convert a 0..=1 probability into clamped percent confidence.
pub fn confidence_from_fraction(fraction: f64) -> f64 {
    clamp_confidence(fraction * 100.0)
}

// ── Subjects (generator input) ────────────────────────────────────────

/// Optional risk sub-factors, each a fraction in [0,1].
///
/// Missing values contribute nothing to the composite risk score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFactors {
    #[serde(default)]
    pub model_variance: Option<f64>,
    #[serde(default)]
    pub data_quality_deficit: Option<f64>,
    #[serde(default)]
    pub market_volatility: Option<f64>,
    #[serde(default)]
    pub injury_impact: Option<f64>,
    #[serde(default)]
    pub weather_impact: Option<f64>,
    #[serde(default)]
    pub sentiment_volatility: Option<f64>,
}

/// A player (or team) that props are generated for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub sport: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub opponent: Option<String>,
    pub game_id: String,
    #[serde(default = "default_platform")]
    pub platform: String,
    /// Recent-form trend in [-1,1]; positive = trending up.
    #[serde(default)]
    pub recent_form: f64,
    #[serde(default)]
    pub risk: Option<RiskFactors>,
    /// Historical max drawdown for props on this subject (fraction).
    #[serde(default)]
    pub max_drawdown: Option<f64>,
}

fn default_platform() -> String {
    "PrizePicks".into()
}

/// Connectivity report for one upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStatus {
    pub name: String,
    pub connected: bool,
    #[serde(default)]
    pub latency_ms: Option<u64>,
}

// ── Opportunities ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Over,
    Under,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Over => f.write_str("OVER"),
            Direction::Under => f.write_str("UNDER"),
        }
    }
}

/// Ordinal grade summarising expected value and confidence.
///
/// Variants are declared worst-first so the derived `Ord` reads naturally:
/// `ValueRating::APlus > ValueRating::D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueRating {
    D,
    C,
    #[serde(rename = "C+")]
    CPlus,
    B,
    #[serde(rename = "B+")]
    BPlus,
    A,
    #[serde(rename = "A+")]
    APlus,
}

/// Descending threshold table; first bound the score reaches wins.
const RATING_THRESHOLDS: [(f64, ValueRating); 6] = [
    (15.0, ValueRating::APlus),
    (12.0, ValueRating::A),
    (9.0, ValueRating::BPlus),
    (6.0, ValueRating::B),
    (3.0, ValueRating::CPlus),
    (1.0, ValueRating::C),
];

impl ValueRating {
    pub fn from_score(value_score: f64) -> Self {
        RATING_THRESHOLDS
            .iter()
            .find(|(bound, _)| value_score >= *bound)
            .map(|(_, rating)| *rating)
            .unwrap_or(ValueRating::D)
    }

    /// Points used by the ranker.
    pub fn rank_points(&self) -> f64 {
        match self {
            ValueRating::APlus => 10.0,
            ValueRating::A => 8.0,
            ValueRating::BPlus => 6.0,
            ValueRating::B => 4.0,
            ValueRating::CPlus => 2.0,
            ValueRating::C => 1.0,
            ValueRating::D => 0.0,
        }
    }

    /// C and D never reach the selector.
    pub fn is_playable(&self) -> bool {
        !matches!(self, ValueRating::C | ValueRating::D)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueRating::APlus => "A+",
            ValueRating::A => "A",
            ValueRating::BPlus => "B+",
            ValueRating::B => "B",
            ValueRating::CPlus => "C+",
            ValueRating::C => "C",
            ValueRating::D => "D",
        }
    }
}

impl fmt::Display for ValueRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data the correlation model compares between legs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationKey {
    pub game_id: String,
    pub subject_id: String,
    pub team: String,
}

/// A single candidate bet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub sport: String,
    pub team: String,
    pub game_id: String,
    pub platform: String,
    /// Stat type, e.g. "Points".
    pub market: String,
    pub direction: Direction,
    pub line: f64,
    pub prediction: f64,
    /// Percent scale, clamped to [50, 98].
    pub confidence: f64,
    /// Signed, unitless edge score.
    pub expected_value: f64,
    /// Fraction of models agreeing on the direction, [0,1].
    pub model_consensus: f64,
    pub kelly_fraction: f64,
    #[serde(default)]
    pub risk_factors: RiskFactors,
    /// [0,1], higher = riskier. Filled by the scorer.
    #[serde(default)]
    pub risk_score: f64,
    /// Filled by the scorer.
    #[serde(default)]
    pub value_score: f64,
    /// Filled by the scorer.
    pub value_rating: ValueRating,
    #[serde(default)]
    pub max_drawdown: f64,
}

impl Opportunity {
    pub fn correlation_key(&self) -> CorrelationKey {
        CorrelationKey {
            game_id: self.game_id.clone(),
            subject_id: self.subject_id.clone(),
            team: self.team.clone(),
        }
    }

    /// Confidence as a probability.
    pub fn win_probability(&self) -> f64 {
        self.confidence / 100.0
    }

    pub fn label(&self) -> String {
        format!(
            "{} {} {} {:.1}",
            self.subject_name, self.market, self.direction, self.line
        )
    }
}

// ── Strategy ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
    Value,
}

impl StrategyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyMode::Conservative => "conservative",
            StrategyMode::Balanced => "balanced",
            StrategyMode::Aggressive => "aggressive",
            StrategyMode::Value => "value",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "conservative" => Some(StrategyMode::Conservative),
            "balanced" => Some(StrategyMode::Balanced),
            "aggressive" => Some(StrategyMode::Aggressive),
            "value" => Some(StrategyMode::Value),
            _ => None,
        }
    }
}

// ── Portfolios ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    /// Mean leg expected value.
    pub expected_return: f64,
    /// Mean leg confidence as a fraction.
    pub win_probability: f64,
    /// Mean leg risk score.
    pub risk_score: f64,
    /// Worst leg drawdown.
    pub max_drawdown: f64,
    pub diversification_score: f64,
    /// Mean leg Kelly fraction.
    pub kelly_fraction: f64,
}

/// A selected lineup. Built once per generation cycle, never edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub strategy: StrategyMode,
    pub legs: Vec<Opportunity>,
    pub metrics: PortfolioMetrics,
}

impl Portfolio {
    pub fn leg_count(&self) -> usize {
        self.legs.len()
    }

    pub fn leg_ids(&self) -> Vec<&str> {
        self.legs.iter().map(|l| l.id.as_str()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoutQuote {
    pub stake: f64,
    pub legs: usize,
    pub multiplier: f64,
    pub payout: f64,
}
