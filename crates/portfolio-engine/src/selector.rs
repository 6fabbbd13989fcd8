//! Greedy, correlation-constrained lineup selector.
//!
//! Walks a ranked candidate list once and admits each candidate only if it
//! clears every constraint against the legs already taken. Order-dependent
//! by construction; rank first.

use std::collections::HashMap;

use chrono::Utc;
use common::config::{EngineConfig, MAX_LEGS, MIN_LEGS};
use common::{Error, Opportunity, Portfolio, StrategyMode};
use tracing::{debug, info};
use uuid::Uuid;

use crate::correlation::{CorrelationModel, HeuristicCorrelation};
use crate::metrics::aggregate;

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionConfig {
    pub target_legs: usize,
    /// Pairwise correlation must stay strictly below this.
    pub correlation_limit: f64,
    /// Percent.
    pub min_confidence: f64,
    pub max_same_team: usize,
    pub max_leg_drawdown: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl SelectionConfig {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            target_legs: config.strategy.target_legs,
            correlation_limit: config.strategy.correlation_limit,
            min_confidence: config.strategy.min_confidence,
            max_same_team: config.strategy.max_same_team,
            max_leg_drawdown: config.risk.max_drawdown,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(MIN_LEGS..=MAX_LEGS).contains(&self.target_legs) {
            return Err(Error::Validation(format!(
                "lineup size must be between {} and {} picks (got {})",
                MIN_LEGS, MAX_LEGS, self.target_legs
            )));
        }
        if self.max_same_team == 0 {
            return Err(Error::Validation("max_same_team must be at least 1".into()));
        }
        Ok(())
    }
}

/// Why a candidate was passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Skip {
    LowConfidence,
    Drawdown,
    TeamCap,
    Correlated,
}

pub struct PortfolioSelector {
    config: SelectionConfig,
    correlation: Box<dyn CorrelationModel>,
}

impl PortfolioSelector {
    pub fn new(config: SelectionConfig) -> Self {
        Self::with_correlation(config, Box::new(HeuristicCorrelation::default()))
    }

    pub fn with_correlation(
        config: SelectionConfig,
        correlation: Box<dyn CorrelationModel>,
    ) -> Self {
        Self {
            config,
            correlation,
        }
    }

    pub fn config(&self) -> &SelectionConfig {
        &self.config
    }

    fn check(
        &self,
        candidate: &Opportunity,
        selected: &[Opportunity],
        team_counts: &HashMap<String, usize>,
    ) -> Option<Skip> {
        if candidate.confidence < self.config.min_confidence {
            return Some(Skip::LowConfidence);
        }
        if candidate.max_drawdown > self.config.max_leg_drawdown {
            return Some(Skip::Drawdown);
        }
        if !candidate.team.is_empty()
            && team_counts.get(&candidate.team).copied().unwrap_or(0) >= self.config.max_same_team
        {
            return Some(Skip::TeamCap);
        }
        let correlated = selected.iter().any(|leg| {
            let c = self.correlation.correlation(candidate, leg);
            // NaN counts as fully correlated.
            c.is_nan() || c >= self.config.correlation_limit
        });
        if correlated {
            return Some(Skip::Correlated);
        }
        None
    }

    /// Choose legs from an already-ranked list.
    pub fn select_legs(&self, ranked: &[Opportunity]) -> Result<Vec<Opportunity>, Error> {
        self.config.validate()?;

        let mut selected: Vec<Opportunity> = Vec::with_capacity(self.config.target_legs);
        let mut team_counts: HashMap<String, usize> = HashMap::new();

        for candidate in ranked {
            if selected.len() >= self.config.target_legs {
                break;
            }
            match self.check(candidate, &selected, &team_counts) {
                Some(reason) => {
                    debug!("{}: skipped ({:?})", candidate.id, reason);
                }
                None => {
                    if !candidate.team.is_empty() {
                        *team_counts.entry(candidate.team.clone()).or_insert(0) += 1;
                    }
                    selected.push(candidate.clone());
                }
            }
        }

        if selected.len() < MIN_LEGS {
            info!(
                "Only {} admissible leg(s) out of {} candidates",
                selected.len(),
                ranked.len()
            );
            return Err(Error::too_few_picks());
        }
        Ok(selected)
    }

    /// Select legs and wrap them in a fresh portfolio with metrics.
    pub fn select(&self, ranked: &[Opportunity], mode: StrategyMode) -> Result<Portfolio, Error> {
        let legs = self.select_legs(ranked)?;
        let metrics = aggregate(&legs);
        Ok(Portfolio {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            strategy: mode,
            legs,
            metrics,
        })
    }
}
