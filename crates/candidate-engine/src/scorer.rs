use common::{Opportunity, RiskFactors, ValueRating};
use tracing::debug;

const W_MODEL_VARIANCE: f64 = 0.3;
const W_DATA_QUALITY: f64 = 0.2;
const W_MARKET_VOLATILITY: f64 = 0.1;
const W_INJURY: f64 = 0.2;
const W_WEATHER: f64 = 0.1;
const W_SENTIMENT: f64 = 0.1;

fn factor(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Expected value scaled by confidence (50% → ×1, 100% → ×2).
pub fn value_score(expected_value: f64, confidence: f64) -> f64 {
    let score = expected_value * (confidence / 50.0);
    if score.is_finite() {
        score
    } else {
        0.0
    }
}

/// Weighted risk in [0,1]. Missing sub-factors count as zero.
pub fn composite_risk(factors: &RiskFactors) -> f64 {
    let total = W_MODEL_VARIANCE * factor(factors.model_variance)
        + W_DATA_QUALITY * factor(factors.data_quality_deficit)
        + W_MARKET_VOLATILITY * factor(factors.market_volatility)
        + W_INJURY * factor(factors.injury_impact)
        + W_WEATHER * factor(factors.weather_impact)
        + W_SENTIMENT * factor(factors.sentiment_volatility);
    total.clamp(0.0, 1.0)
}

/// Fill value score, rating and risk score in place.
///
/// `data_quality` is the feed-level quality in [0,1]; when present it
/// stands in for any leg missing its own data-quality deficit.
pub fn score(opportunities: &mut [Opportunity], data_quality: Option<f64>) {
    let feed_deficit = data_quality
        .filter(|q| q.is_finite())
        .map(|q| 1.0 - q.clamp(0.0, 1.0));

    for opp in opportunities.iter_mut() {
        if opp.risk_factors.data_quality_deficit.is_none() {
            opp.risk_factors.data_quality_deficit = feed_deficit;
        }
        opp.value_score = value_score(opp.expected_value, opp.confidence);
        opp.value_rating = ValueRating::from_score(opp.value_score);
        opp.risk_score = composite_risk(&opp.risk_factors);
    }
}

/// Hard filter: C and D never reach the selector.
pub fn playable(opportunities: Vec<Opportunity>) -> Vec<Opportunity> {
    let before = opportunities.len();
    let kept: Vec<Opportunity> = opportunities
        .into_iter()
        .filter(|o| o.value_rating.is_playable())
        .collect();
    debug!("Rating filter kept {}/{} opportunities", kept.len(), before);
    kept
}

pub fn score_and_filter(
    mut opportunities: Vec<Opportunity>,
    data_quality: Option<f64>,
) -> Vec<Opportunity> {
    score(&mut opportunities, data_quality);
    playable(opportunities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Direction;

    fn opp(id: &str, ev: f64, confidence: f64) -> Opportunity {
        Opportunity {
            id: id.into(),
            subject_id: id.into(),
            subject_name: id.into(),
            sport: "NBA".into(),
            team: "BOS".into(),
            game_id: "G1".into(),
            platform: "PrizePicks".into(),
            market: "Points".into(),
            direction: Direction::Over,
            line: 20.5,
            prediction: 23.0,
            confidence,
            expected_value: ev,
            model_consensus: 0.8,
            kelly_fraction: 0.05,
            risk_factors: RiskFactors::default(),
            risk_score: 0.0,
            value_score: 0.0,
            value_rating: ValueRating::D,
            max_drawdown: 0.0,
        }
    }

    #[test]
    fn test_value_score_formula() {
        assert!((value_score(6.0, 75.0) - 9.0).abs() < 1e-12);
        assert_eq!(value_score(f64::NAN, 70.0), 0.0);
    }

    #[test]
    fn test_ratings_assigned_from_value_score() {
        // ev × conf/50: 7.5×2=15 → A+, 6×2=12 → A, 3×1.5=4.5 → C+, 0.5 → D
        let mut opps = vec![
            opp("a", 7.5, 100.0),
            opp("b", 6.0, 100.0),
            opp("c", 3.0, 75.0),
            opp("d", 0.5, 50.0),
        ];
        score(&mut opps, None);
        let ratings: Vec<_> = opps.iter().map(|o| o.value_rating).collect();
        assert_eq!(
            ratings,
            vec![ValueRating::APlus, ValueRating::A, ValueRating::CPlus, ValueRating::D]
        );
    }

    #[test]
    fn test_playable_drops_c_and_d_only() {
        let mut opps = vec![
            opp("cplus", 2.0, 75.0), // 3.0 → C+
            opp("c", 1.0, 50.0),     // 1.0 → C
            opp("d", 0.2, 60.0),     // D
        ];
        score(&mut opps, None);
        let kept = playable(opps);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "cplus");
    }

    #[test]
    fn test_full_risk_weights_sum_to_one() {
        let all = RiskFactors {
            model_variance: Some(1.0),
            data_quality_deficit: Some(1.0),
            market_volatility: Some(1.0),
            injury_impact: Some(1.0),
            weather_impact: Some(1.0),
            sentiment_volatility: Some(1.0),
        };
        assert!((composite_risk(&all) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_factors_contribute_zero() {
        let partial = RiskFactors {
            injury_impact: Some(0.5),
            ..Default::default()
        };
        assert!((composite_risk(&partial) - 0.1).abs() < 1e-12);
        assert_eq!(composite_risk(&RiskFactors::default()), 0.0);
    }

    #[test]
    fn test_out_of_range_factors_are_clipped() {
        let wild = RiskFactors {
            model_variance: Some(4.0),
            data_quality_deficit: Some(-2.0),
            market_volatility: Some(f64::NAN),
            injury_impact: Some(9.0),
            weather_impact: Some(9.0),
            sentiment_volatility: Some(9.0),
        };
        let risk = composite_risk(&wild);
        assert!((0.0..=1.0).contains(&risk));
        assert!((risk - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_feed_quality_fills_missing_deficit() {
        let mut opps = vec![opp("a", 5.0, 70.0)];
        score(&mut opps, Some(0.6));
        let deficit = opps[0].risk_factors.data_quality_deficit.unwrap();
        assert!((deficit - 0.4).abs() < 1e-12);
        assert!((opps[0].risk_score - 0.08).abs() < 1e-12);
    }
}
