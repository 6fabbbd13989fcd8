//! End-to-end lineup pipeline: fetch → generate → score/filter → rank → select.

use std::time::Duration;

use candidate_engine::{playable, score_and_filter, OpportunityGenerator};
use common::{EngineConfig, Error, Opportunity, Portfolio, Result, SourceStatus, StrategyMode};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::correlation::CorrelationModel;
use crate::payout::PayoutTable;
use crate::ranker::rank;
use crate::selector::{PortfolioSelector, SelectionConfig};
use crate::session::SessionContext;

/// Result of one recommendation cycle. Replaces the previous one wholesale.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    pub portfolio: Option<Portfolio>,
    /// Playable candidates, best first.
    pub ranked: Vec<Opportunity>,
    /// Upstream failed, timed out or was empty; `ranked` is empty.
    pub degraded: bool,
    pub sources: Vec<SourceStatus>,
    /// User-facing message when no portfolio was produced.
    pub error: Option<String>,
}

pub struct LineupEngine {
    generator: OpportunityGenerator,
    selector: PortfolioSelector,
    payout: PayoutTable,
    mode: StrategyMode,
    fetch_timeout: Duration,
}

impl LineupEngine {
    pub fn from_config(config: &EngineConfig) -> Result<Self> {
        let selection = SelectionConfig::from_config(config);
        selection.validate()?;
        Ok(Self {
            generator: OpportunityGenerator::from_config(&config.generator),
            selector: PortfolioSelector::new(selection),
            payout: PayoutTable::from_config(&config.payout)?,
            mode: config.strategy.mode,
            fetch_timeout: Duration::from_millis(config.timing.fetch_timeout_ms),
        })
    }

    /// Swap the pairwise correlation strategy.
    pub fn with_correlation(mut self, correlation: Box<dyn CorrelationModel>) -> Self {
        let config = self.selector.config().clone();
        self.selector = PortfolioSelector::with_correlation(config, correlation);
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn payout(&self) -> &PayoutTable {
        &self.payout
    }

    /// Drop C/D ratings, then rank best-first under the engine's mode.
    pub fn rank_candidates(&self, scored: Vec<Opportunity>) -> Vec<Opportunity> {
        rank(playable(scored), self.mode)
    }

    /// Build a portfolio from already-scored opportunities.
    pub fn recommend(&self, scored: Vec<Opportunity>) -> Result<Portfolio> {
        let ranked = self.rank_candidates(scored);
        self.selector.select(&ranked, self.mode)
    }

    fn degraded(ctx: &SessionContext, err: &Error) -> RecommendationOutcome {
        warn!("Degraded cycle ({}): {}", ctx.source_name(), err);
        RecommendationOutcome {
            portfolio: None,
            ranked: Vec::new(),
            degraded: true,
            sources: ctx.last_sources().to_vec(),
            error: Some(err.user_message()),
        }
    }

    /// Run one full cycle against the session's source and model.
    ///
    /// Never fails: an unreachable or empty upstream degrades to an empty
    /// candidate set and selection errors are reported through `error`.
    pub async fn generate(&self, ctx: &mut SessionContext) -> RecommendationOutcome {
        let feed = match ctx.fetch(self.fetch_timeout).await {
            Ok(feed) => feed,
            Err(e) => return Self::degraded(ctx, &e),
        };
        if feed.subjects.is_empty() {
            let err = Error::NoOpportunities(format!("{} returned no subjects", ctx.source_name()));
            return Self::degraded(ctx, &err);
        }

        let generated = self.generator.generate(&feed.subjects, ctx.model_mut());
        if generated.is_empty() {
            let err = Error::NoOpportunities(format!(
                "none of {} subjects produced an opportunity",
                feed.subjects.len()
            ));
            return Self::degraded(ctx, &err);
        }
        let scored = score_and_filter(generated, feed.data_quality);
        let ranked = rank(scored, self.mode);
        debug!("{} playable candidates after ranking", ranked.len());

        let (portfolio, error) = match self.selector.select(&ranked, self.mode) {
            Ok(p) => {
                info!(
                    "Lineup {} ({} legs, mode={}): EV {:.2}, win {:.1}%, risk {:.2}",
                    p.id,
                    p.leg_count(),
                    p.strategy.as_str(),
                    p.metrics.expected_return,
                    p.metrics.win_probability * 100.0,
                    p.metrics.risk_score
                );
                (Some(p), None)
            }
            Err(e) => {
                if e.is_user_facing() {
                    info!("No lineup this cycle: {}", e);
                } else {
                    warn!("Selection failed: {}", e);
                }
                (None, Some(e.user_message()))
            }
        };

        RecommendationOutcome {
            portfolio,
            ranked,
            degraded: false,
            sources: ctx.last_sources().to_vec(),
            error,
        }
    }
}
