//! Configuration loader: merges .env, lineup.toml, and LINEUP_* env vars.

use std::path::Path;

use common::config::{DataSourceKind, EngineConfig, MAX_LEGS, MIN_LEGS};
use common::{Error, StrategyMode};

const DEFAULT_CONFIG_FILE: &str = "lineup.toml";

fn parse_non_negative_f64(raw: &str, env_name: &str) -> Result<f64, Error> {
    let parsed = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| Error::Config(format!("{env_name} must be a number >= 0")))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(Error::Config(format!("{env_name} must be a number >= 0")));
    }
    Ok(parsed)
}

fn parse_positive_u64(raw: &str, env_name: &str) -> Result<u64, Error> {
    let parsed = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::Config(format!("{env_name} must be an integer > 0")))?;
    if parsed == 0 {
        return Err(Error::Config(format!("{env_name} must be an integer > 0")));
    }
    Ok(parsed)
}

fn validate_config(config: &EngineConfig) -> Result<(), Error> {
    let mut issues: Vec<String> = Vec::new();

    // NaN slips through every ordered comparison below.
    let amounts = [
        ("strategy.correlation_limit", config.strategy.correlation_limit),
        ("strategy.min_confidence", config.strategy.min_confidence),
        ("generator.decimal_odds", config.generator.decimal_odds),
        ("generator.kelly_multiplier", config.generator.kelly_multiplier),
        ("risk.max_drawdown", config.risk.max_drawdown),
        ("risk.max_exposure", config.risk.max_exposure),
        ("risk.default_stake", config.risk.default_stake),
    ];
    for (name, value) in amounts {
        if !value.is_finite() {
            issues.push(format!("{name} must be a finite number"));
        }
    }

    if !(MIN_LEGS..=MAX_LEGS).contains(&config.strategy.target_legs) {
        issues.push(format!(
            "strategy.target_legs must be between {MIN_LEGS} and {MAX_LEGS}"
        ));
    }
    if !(0.0..=1.0).contains(&config.strategy.correlation_limit) {
        issues.push("strategy.correlation_limit must be in [0,1]".into());
    }
    if !(0.0..=100.0).contains(&config.strategy.min_confidence) {
        issues.push("strategy.min_confidence must be in [0,100]".into());
    }
    if config.strategy.max_same_team == 0 {
        issues.push("strategy.max_same_team must be > 0".into());
    }

    if config.generator.decimal_odds <= 1.0 {
        issues.push("generator.decimal_odds must be > 1".into());
    }
    if !(0.0..=1.0).contains(&config.generator.kelly_multiplier) {
        issues.push("generator.kelly_multiplier must be in [0,1]".into());
    }
    for (sport, stats) in &config.generator.stat_overrides {
        if stats.is_empty() {
            issues.push(format!("generator.stat_overrides.{sport} must list at least one stat"));
        }
        if stats.iter().any(|s| !s.base_line.is_finite() || s.base_line <= 0.0) {
            issues.push(format!("generator.stat_overrides.{sport} base lines must be > 0"));
        }
    }

    if !(0.0..=1.0).contains(&config.risk.max_drawdown) {
        issues.push("risk.max_drawdown must be in [0,1]".into());
    }
    if config.risk.max_exposure <= 0.0 {
        issues.push("risk.max_exposure must be > 0".into());
    }
    if config.risk.default_stake <= 0.0 {
        issues.push("risk.default_stake must be > 0".into());
    }
    if config.risk.default_stake > config.risk.max_exposure {
        issues.push("risk.default_stake must be <= risk.max_exposure".into());
    }

    if config.payout.tiers.is_empty() {
        issues.push("payout.tiers must contain at least one tier".into());
    }
    for tier in &config.payout.tiers {
        if !(MIN_LEGS..=MAX_LEGS).contains(&tier.legs) {
            issues.push(format!("payout tier for {} legs is out of range", tier.legs));
        }
        if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
            issues.push(format!("payout multiplier for {} legs must be > 0", tier.legs));
        }
    }
    if !config
        .payout
        .tiers
        .iter()
        .any(|t| t.legs == config.strategy.target_legs)
    {
        issues.push("payout.tiers has no entry for strategy.target_legs".into());
    }

    if config.timing.refresh_interval_secs == 0 {
        issues.push("timing.refresh_interval_secs must be > 0".into());
    }
    if config.timing.fetch_timeout_ms == 0 {
        issues.push("timing.fetch_timeout_ms must be > 0".into());
    }

    match config.data.source {
        DataSourceKind::File => {
            if config.data.path.as_deref().map_or(true, |p| p.trim().is_empty()) {
                issues.push("data.path is required when data.source = \"file\"".into());
            }
        }
        DataSourceKind::Synthetic => {
            if config.data.synthetic_subjects == 0 {
                issues.push("data.synthetic_subjects must be > 0".into());
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(Error::Config(format!(
            "Invalid config:\n - {}",
            issues.join("\n - ")
        )))
    }
}

/// Apply LINEUP_* overrides. `lookup` abstracts the environment for tests.
fn apply_env_overrides(
    config: &mut EngineConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), Error> {
    if let Some(raw) = lookup("LINEUP_MODE") {
        config.strategy.mode = StrategyMode::parse(&raw).ok_or_else(|| {
            Error::Config(
                "LINEUP_MODE must be one of: conservative, balanced, aggressive, value".into(),
            )
        })?;
    }
    if let Some(raw) = lookup("LINEUP_TARGET_LEGS") {
        config.strategy.target_legs = parse_positive_u64(&raw, "LINEUP_TARGET_LEGS")? as usize;
    }
    if let Some(raw) = lookup("LINEUP_CORRELATION_LIMIT") {
        config.strategy.correlation_limit =
            parse_non_negative_f64(&raw, "LINEUP_CORRELATION_LIMIT")?;
    }
    if let Some(raw) = lookup("LINEUP_MIN_CONFIDENCE") {
        config.strategy.min_confidence = parse_non_negative_f64(&raw, "LINEUP_MIN_CONFIDENCE")?;
    }
    if let Some(raw) = lookup("LINEUP_MAX_SAME_TEAM") {
        config.strategy.max_same_team =
            parse_positive_u64(&raw, "LINEUP_MAX_SAME_TEAM")? as usize;
    }
    if let Some(raw) = lookup("LINEUP_MAX_DRAWDOWN") {
        config.risk.max_drawdown = parse_non_negative_f64(&raw, "LINEUP_MAX_DRAWDOWN")?;
    }
    if let Some(raw) = lookup("LINEUP_MAX_EXPOSURE") {
        config.risk.max_exposure = parse_non_negative_f64(&raw, "LINEUP_MAX_EXPOSURE")?;
    }
    if let Some(raw) = lookup("LINEUP_DEFAULT_STAKE") {
        config.risk.default_stake = parse_non_negative_f64(&raw, "LINEUP_DEFAULT_STAKE")?;
    }
    if let Some(raw) = lookup("LINEUP_SEED") {
        let seed = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| Error::Config("LINEUP_SEED must be an unsigned integer".into()))?;
        config.generator.seed = Some(seed);
    }
    if let Some(raw) = lookup("LINEUP_REFRESH_SECS") {
        config.timing.refresh_interval_secs = parse_positive_u64(&raw, "LINEUP_REFRESH_SECS")?;
    }
    if let Some(raw) = lookup("LINEUP_FETCH_TIMEOUT_MS") {
        config.timing.fetch_timeout_ms = parse_positive_u64(&raw, "LINEUP_FETCH_TIMEOUT_MS")?;
    }
    // A data path implies the file source.
    if let Some(raw) = lookup("LINEUP_DATA_PATH") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            config.data.source = DataSourceKind::File;
            config.data.path = Some(trimmed.to_string());
        }
    }
    Ok(())
}

fn parse_config_file(path: &Path) -> Result<EngineConfig, Error> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
    toml::from_str(&contents)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Load engine configuration.
///
/// An explicit `path` must exist; otherwise `lineup.toml` in the working
/// directory is used when present.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, Error> {
    // 1. .env from the working directory or a parent.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {}", e);
    }

    // 2. Defaults, replaced by the config file if any.
    let mut config = match path {
        Some(p) => parse_config_file(p)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                parse_config_file(default_path)?
            } else {
                EngineConfig::default()
            }
        }
    };

    // 3. Environment has the last word.
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_config(&config)?;
    Ok(config)
}
