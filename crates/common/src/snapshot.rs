//! Plain-JSON backup/restore document for settings and saved lineups.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::Error;
use crate::types::{Opportunity, PayoutQuote, Portfolio, PortfolioMetrics, StrategyMode};

pub const DOCUMENT_VERSION: u32 = 1;

/// Importable copy of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub strategy: StrategyMode,
    pub legs: Vec<Opportunity>,
    pub metrics: PortfolioMetrics,
    #[serde(default)]
    pub payout: Option<PayoutQuote>,
}

impl PortfolioSnapshot {
    pub fn from_portfolio(portfolio: &Portfolio, payout: Option<PayoutQuote>) -> Self {
        Self {
            id: portfolio.id.clone(),
            saved_at: Utc::now(),
            strategy: portfolio.strategy,
            legs: portfolio.legs.clone(),
            metrics: portfolio.metrics.clone(),
            payout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineupDocument {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub settings: EngineConfig,
    #[serde(default)]
    pub lineups: Vec<PortfolioSnapshot>,
}

impl LineupDocument {
    pub fn new(settings: EngineConfig, lineups: Vec<PortfolioSnapshot>) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            exported_at: Utc::now(),
            settings,
            lineups,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self, Error> {
        let doc: LineupDocument = serde_json::from_str(raw)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(Error::Validation(format!(
                "unsupported lineup document version {} (expected {})",
                doc.version, DOCUMENT_VERSION
            )));
        }
        for lineup in &doc.lineups {
            if lineup.legs.len() < crate::config::MIN_LEGS {
                return Err(Error::Validation(format!(
                    "saved lineup {} has {} legs; {}",
                    lineup.id,
                    lineup.legs.len(),
                    crate::error::MSG_MIN_PICKS
                )));
            }
        }
        Ok(doc)
    }
}
