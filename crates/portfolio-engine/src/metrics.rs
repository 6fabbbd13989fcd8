use std::collections::HashSet;

use common::{Opportunity, PortfolioMetrics};

/// Distinct sport/platform/bet-type tags over the maximum possible (3 per leg).
pub fn diversification_score(legs: &[Opportunity]) -> f64 {
    if legs.is_empty() {
        return 0.0;
    }
    let mut tags: HashSet<String> = HashSet::new();
    for leg in legs {
        tags.insert(format!("sport:{}", leg.sport.to_ascii_lowercase()));
        tags.insert(format!("platform:{}", leg.platform.to_ascii_lowercase()));
        tags.insert(format!("bet:{}", leg.market.to_ascii_lowercase()));
    }
    (tags.len() as f64 / (3.0 * legs.len() as f64)).clamp(0.0, 1.0)
}

fn mean(values: impl Iterator<Item = f64>, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let avg = values.sum::<f64>() / n as f64;
    if avg.is_finite() {
        avg
    } else {
        0.0
    }
}

/// Aggregate metrics over the selected legs. Empty input gives zeros.
pub fn aggregate(legs: &[Opportunity]) -> PortfolioMetrics {
    let n = legs.len();
    if n == 0 {
        return PortfolioMetrics::default();
    }
    PortfolioMetrics {
        expected_return: mean(legs.iter().map(|l| l.expected_value), n),
        win_probability: mean(legs.iter().map(|l| l.win_probability()), n).clamp(0.0, 1.0),
        risk_score: mean(legs.iter().map(|l| l.risk_score), n).clamp(0.0, 1.0),
        max_drawdown: legs
            .iter()
            .map(|l| l.max_drawdown)
            .filter(|d| d.is_finite())
            .fold(0.0, f64::max),
        diversification_score: diversification_score(legs),
        kelly_fraction: mean(legs.iter().map(|l| l.kelly_fraction), n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::leg;
    use common::ValueRating;

    #[test]
    fn test_empty_is_all_zero() {
        assert_eq!(aggregate(&[]), PortfolioMetrics::default());
        assert_eq!(diversification_score(&[]), 0.0);
    }

    #[test]
    fn test_means_and_max_drawdown() {
        let mut a = leg("a", 4.0, 60.0, ValueRating::B);
        let mut b = leg("b", 8.0, 80.0, ValueRating::A);
        a.max_drawdown = 0.05;
        b.max_drawdown = 0.3;
        a.risk_score = 0.1;
        b.risk_score = 0.3;
        let m = aggregate(&[a, b]);
        assert!((m.expected_return - 6.0).abs() < 1e-12);
        assert!((m.win_probability - 0.7).abs() < 1e-12);
        assert!((m.risk_score - 0.2).abs() < 1e-12);
        assert_eq!(m.max_drawdown, 0.3);
    }

    #[test]
    fn test_diversification_counts_distinct_tags() {
        // Same sport/platform/market on all three legs: 3 tags / 9.
        let legs = vec![
            leg("a", 4.0, 60.0, ValueRating::B),
            leg("b", 4.0, 60.0, ValueRating::B),
            leg("c", 4.0, 60.0, ValueRating::B),
        ];
        assert!((diversification_score(&legs) - 1.0 / 3.0).abs() < 1e-12);

        let mut mixed = legs.clone();
        mixed[1].sport = "NFL".into();
        mixed[1].market = "Rushing Yards".into();
        mixed[2].platform = "Underdog".into();
        mixed[2].market = "Assists".into();
        // sports {nba,nfl}, platforms {prizepicks,underdog}, bets {points,rushing,assists}
        assert!((diversification_score(&mixed) - 7.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_leg_fully_diverse() {
        assert_eq!(diversification_score(&[leg("a", 1.0, 60.0, ValueRating::B)]), 1.0);
    }
}
