//! Pairwise leg correlation.
//!
//! The heuristic below is a placeholder, not a fitted model; anything
//! implementing `CorrelationModel` can replace it.

use common::Opportunity;

pub trait CorrelationModel: Send + Sync {
    /// Similarity in [0,1] between two legs.
    fn correlation(&self, a: &Opportunity, b: &Opportunity) -> f64;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicCorrelation {
    pub same_game: f64,
    pub same_subject: f64,
    /// Assumed correlation for unrelated legs; must stay below 0.3.
    pub baseline: f64,
}

impl Default for HeuristicCorrelation {
    fn default() -> Self {
        Self {
            same_game: 0.9,
            same_subject: 0.6,
            baseline: 0.1,
        }
    }
}

impl HeuristicCorrelation {
    pub fn with_baseline(baseline: f64) -> Self {
        Self {
            baseline: baseline.clamp(0.0, 0.29),
            ..Self::default()
        }
    }
}

fn same_subject(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

impl CorrelationModel for HeuristicCorrelation {
    fn correlation(&self, a: &Opportunity, b: &Opportunity) -> f64 {
        if !a.game_id.is_empty() && a.game_id == b.game_id {
            self.same_game
        } else if same_subject(&a.subject_id, &b.subject_id) {
            self.same_subject
        } else {
            self.baseline
        }
    }
}
