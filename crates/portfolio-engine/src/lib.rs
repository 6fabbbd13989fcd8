//! Portfolio engine crate.
//!
//! Ranks scored opportunities, greedily assembles a correlation-constrained
//! lineup, and prices it against the payout table.

pub mod correlation;
pub mod metrics;
pub mod payout;
pub mod pipeline;
pub mod ranker;
pub mod selector;
pub mod session;

pub use correlation::{CorrelationModel, HeuristicCorrelation};
pub use metrics::{aggregate, diversification_score};
pub use payout::PayoutTable;
pub use pipeline::{LineupEngine, RecommendationOutcome};
pub use ranker::{rank, rank_score};
pub use selector::{PortfolioSelector, SelectionConfig};
pub use session::SessionContext;

#[cfg(test)]
mod test_support;
