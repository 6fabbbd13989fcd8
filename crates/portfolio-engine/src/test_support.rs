//! Fixtures shared by the unit tests in this crate.

use common::{Direction, Opportunity, RiskFactors, ValueRating};

/// A scored leg with its own game, team and subject.
pub fn leg(id: &str, expected_value: f64, confidence: f64, rating: ValueRating) -> Opportunity {
    Opportunity {
        id: format!("{id}:points"),
        subject_id: id.into(),
        subject_name: format!("Player {id}"),
        sport: "NBA".into(),
        team: format!("T-{id}"),
        game_id: format!("G-{id}"),
        platform: "PrizePicks".into(),
        market: "Points".into(),
        direction: Direction::Over,
        line: 20.5,
        prediction: 23.0,
        confidence,
        expected_value,
        model_consensus: 0.8,
        kelly_fraction: 0.05,
        risk_factors: RiskFactors::default(),
        risk_score: 0.2,
        value_score: expected_value * confidence / 50.0,
        value_rating: rating,
        max_drawdown: 0.1,
    }
}
