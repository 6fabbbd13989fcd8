use common::{Opportunity, StrategyMode};

/// Composite rank score for one opportunity under a strategy.
pub fn rank_score(opp: &Opportunity, mode: StrategyMode) -> f64 {
    let ev = opp.expected_value;
    let risk_adjusted_return = ev * (1.0 - opp.risk_score.clamp(0.0, 1.0));

    let base = 0.3 * ev
        + 0.2 * opp.win_probability()
        + 0.2 * risk_adjusted_return
        + 0.1 * opp.model_consensus
        + 0.1 * opp.value_rating.rank_points();

    let adjustment = match mode {
        StrategyMode::Conservative => -0.3 * opp.risk_score,
        StrategyMode::Aggressive => 0.2 * ev,
        StrategyMode::Balanced | StrategyMode::Value => 0.0,
    };

    let score = base + adjustment;
    if score.is_nan() {
        f64::NEG_INFINITY
    } else {
        score
    }
}

/// Sort best-first. Stable, so ties keep input order.
pub fn rank(candidates: Vec<Opportunity>, mode: StrategyMode) -> Vec<Opportunity> {
    let mut scored: Vec<(f64, Opportunity)> = candidates
        .into_iter()
        .map(|o| (rank_score(&o, mode), o))
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    scored.into_iter().map(|(_, o)| o).collect()
}
