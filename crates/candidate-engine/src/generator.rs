//! Opportunity generator.
//!
//! Expands every subject into one prop per stat market offered for its
//! sport, asks the prediction model for a projection, and derives
//! confidence, expected value and Kelly sizing. Scoring happens later.

use std::collections::BTreeMap;

use common::config::{GeneratorConfig, StatLine};
use common::{
    clamp_confidence, confidence_from_fraction, Direction, Opportunity, RiskFactors, Subject,
    ValueRating,
};
use tracing::{debug, warn};

use crate::model::PredictionModel;

/// Per-sport stat universe.
#[derive(Debug, Clone)]
pub struct StatTable {
    sports: BTreeMap<String, Vec<StatLine>>,
    fallback: Vec<StatLine>,
}

impl Default for StatTable {
    fn default() -> Self {
        let mut sports = BTreeMap::new();
        sports.insert(
            "NBA".to_string(),
            vec![
                StatLine::new("Points", 22.5),
                StatLine::new("Rebounds", 7.5),
                StatLine::new("Assists", 5.5),
                StatLine::new("3-Pointers Made", 2.5),
                StatLine::new("Steals", 1.5),
                StatLine::new("Blocks", 1.0),
            ],
        );
        sports.insert(
            "NFL".to_string(),
            vec![
                StatLine::new("Passing Yards", 245.5),
                StatLine::new("Rushing Yards", 65.5),
                StatLine::new("Receiving Yards", 55.5),
                StatLine::new("Receptions", 4.5),
                StatLine::new("Touchdowns", 0.5),
            ],
        );
        sports.insert(
            "MLB".to_string(),
            vec![
                StatLine::new("Hits", 1.5),
                StatLine::new("Total Bases", 1.5),
                StatLine::new("Strikeouts", 5.5),
                StatLine::new("RBIs", 0.5),
            ],
        );
        sports.insert(
            "NHL".to_string(),
            vec![
                StatLine::new("Shots on Goal", 2.5),
                StatLine::new("Points", 0.5),
                StatLine::new("Saves", 27.5),
            ],
        );
        sports.insert(
            "SOCCER".to_string(),
            vec![
                StatLine::new("Shots", 2.5),
                StatLine::new("Shots on Target", 1.0),
                StatLine::new("Passes", 45.5),
            ],
        );
        Self {
            sports,
            fallback: vec![StatLine::new("Points", 10.0)],
        }
    }
}

impl StatTable {
    /// Built-in table with whole-sport replacements applied.
    pub fn with_overrides(overrides: &BTreeMap<String, Vec<StatLine>>) -> Self {
        let mut table = Self::default();
        for (sport, stats) in overrides {
            if stats.is_empty() {
                continue;
            }
            table.sports.insert(sport.to_ascii_uppercase(), stats.clone());
        }
        table
    }

    /// Stats for a sport; unknown sports get a single "Points" market.
    pub fn stats_for(&self, sport: &str) -> &[StatLine] {
        match self.sports.get(&sport.trim().to_ascii_uppercase()) {
            Some(stats) => stats,
            None => {
                debug!("Unknown sport '{}', falling back to Points", sport);
                &self.fallback
            }
        }
    }
}

/// Line after recent-form adjustment, snapped to the nearest half point.
pub fn adjusted_line(base_line: f64, recent_form: f64) -> f64 {
    let form = if recent_form.is_finite() {
        recent_form.clamp(-1.0, 1.0)
    } else {
        0.0
    };
    let raw = base_line * (1.0 + 0.1 * form);
    ((raw * 2.0).round() / 2.0).max(0.5)
}

/// Edge in percent of the line, discounted by how far confidence sits
/// above a coin flip.
pub fn expected_value(line: f64, prediction: f64, confidence_pct: f64) -> f64 {
    if line <= 0.0 || !line.is_finite() {
        return 0.0;
    }
    let edge_pct = (prediction - line).abs() / line * 100.0;
    let p = confidence_pct / 100.0;
    let ev = edge_pct * (2.0 * p - 1.0);
    (ev * 100.0).round() / 100.0
}

/// Fractional Kelly stake for a leg at the given decimal odds.
pub fn kelly_fraction(win_probability: f64, decimal_odds: f64, multiplier: f64) -> f64 {
    let b = decimal_odds - 1.0;
    if b <= 0.0 || !b.is_finite() {
        return 0.0;
    }
    let p = win_probability.clamp(0.0, 1.0);
    let f_star = (b * p - (1.0 - p)) / b;
    (f_star.max(0.0) * multiplier).clamp(0.0, 1.0)
}

fn slug(market: &str) -> String {
    let mut out = String::with_capacity(market.len());
    for ch in market.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

pub struct OpportunityGenerator {
    table: StatTable,
    decimal_odds: f64,
    kelly_multiplier: f64,
}

impl OpportunityGenerator {
    pub fn new(table: StatTable, decimal_odds: f64, kelly_multiplier: f64) -> Self {
        Self {
            table,
            decimal_odds,
            kelly_multiplier,
        }
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        Self::new(
            StatTable::with_overrides(&config.stat_overrides),
            config.decimal_odds,
            config.kelly_multiplier,
        )
    }

    /// One opportunity per (subject, stat) pair.
    ///
    /// Subjects missing an id or game id are dropped at this boundary.
    pub fn generate(
        &self,
        subjects: &[Subject],
        model: &mut dyn PredictionModel,
    ) -> Vec<Opportunity> {
        let mut out = Vec::new();
        for subject in subjects {
            if subject.id.trim().is_empty() || subject.game_id.trim().is_empty() {
                warn!(
                    "Dropping subject with missing id/game_id (name='{}')",
                    subject.name
                );
                continue;
            }
            for stat in self.table.stats_for(&subject.sport) {
                out.push(self.build(subject, stat, model));
            }
        }
        debug!(
            "Generated {} opportunities from {} subjects via model '{}'",
            out.len(),
            subjects.len(),
            model.name()
        );
        out
    }

    fn build(
        &self,
        subject: &Subject,
        stat: &StatLine,
        model: &mut dyn PredictionModel,
    ) -> Opportunity {
        let line = adjusted_line(stat.base_line, subject.recent_form);
        let output = model.predict(subject, &stat.market, line).sanitized(line);

        let edge_ratio = (output.prediction - line).abs() / line;
        let confidence = clamp_confidence(
            confidence_from_fraction(output.confidence_fraction)
                + 10.0 * edge_ratio * output.model_consensus,
        );
        let direction = if output.prediction >= line {
            Direction::Over
        } else {
            Direction::Under
        };

        let mut risk_factors: RiskFactors = subject.risk.clone().unwrap_or_default();
        if risk_factors.model_variance.is_none() {
            risk_factors.model_variance = Some(1.0 - output.model_consensus);
        }

        let name = if subject.name.is_empty() {
            subject.id.clone()
        } else {
            subject.name.clone()
        };

        Opportunity {
            id: format!("{}:{}", subject.id, slug(&stat.market)),
            subject_id: subject.id.clone(),
            subject_name: name,
            sport: subject.sport.clone(),
            team: subject.team.clone(),
            game_id: subject.game_id.clone(),
            platform: subject.platform.clone(),
            market: stat.market.clone(),
            direction,
            line,
            prediction: (output.prediction * 10.0).round() / 10.0,
            confidence,
            expected_value: expected_value(line, output.prediction, confidence),
            model_consensus: output.model_consensus,
            kelly_fraction: kelly_fraction(
                confidence / 100.0,
                self.decimal_odds,
                self.kelly_multiplier,
            ),
            risk_factors,
            risk_score: 0.0,
            value_score: 0.0,
            value_rating: ValueRating::D,
            max_drawdown: subject.max_drawdown.unwrap_or(0.0).clamp(0.0, 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelOutput;
    use common::{CONFIDENCE_MAX, CONFIDENCE_MIN};

    /// Always projects line × factor with fixed confidence.
    struct FixedModel {
        factor: f64,
        confidence: f64,
        calls: usize,
    }

    impl PredictionModel for FixedModel {
        fn name(&self) -> &str {
            "fixed"
        }

        fn predict(&mut self, _subject: &Subject, _market: &str, line: f64) -> ModelOutput {
            self.calls += 1;
            ModelOutput {
                prediction: line * self.factor,
                confidence_fraction: self.confidence,
                model_consensus: 1.0,
            }
        }
    }

    fn subject(id: &str, sport: &str) -> Subject {
        Subject {
            id: id.into(),
            name: format!("Player {id}"),
            sport: sport.into(),
            team: "BOS".into(),
            opponent: Some("NYK".into()),
            game_id: "G1".into(),
            platform: "PrizePicks".into(),
            recent_form: 0.0,
            risk: None,
            max_drawdown: Some(0.12),
        }
    }

    fn generator() -> OpportunityGenerator {
        OpportunityGenerator::from_config(&GeneratorConfig::default())
    }

    #[test]
    fn test_one_opportunity_per_subject_stat_pair() {
        let mut model = FixedModel { factor: 1.1, confidence: 0.7, calls: 0 };
        let subjects = vec![subject("p1", "NBA"), subject("p2", "nba")];
        let opps = generator().generate(&subjects, &mut model);
        assert_eq!(opps.len(), 12);
        assert_eq!(model.calls, 12);
        assert!(opps.iter().any(|o| o.id == "p1:3-pointers-made"));
    }

    #[test]
    fn test_unknown_sport_falls_back_to_points() {
        let mut model = FixedModel { factor: 1.1, confidence: 0.7, calls: 0 };
        let opps = generator().generate(&[subject("x", "Curling")], &mut model);
        assert_eq!(opps.len(), 1);
        assert_eq!(opps[0].market, "Points");
        assert_eq!(opps[0].line, 10.0);
    }

    #[test]
    fn test_confidence_always_in_band() {
        for (factor, conf) in [(3.0, 0.99), (1.0, 0.0), (0.2, 0.4), (1.05, 0.97)] {
            let mut model = FixedModel { factor, confidence: conf, calls: 0 };
            for opp in generator().generate(&[subject("p", "NBA")], &mut model) {
                assert!(
                    (CONFIDENCE_MIN..=CONFIDENCE_MAX).contains(&opp.confidence),
                    "confidence {} out of band",
                    opp.confidence
                );
            }
        }
    }

    #[test]
    fn test_direction_follows_prediction() {
        let mut over = FixedModel { factor: 1.2, confidence: 0.7, calls: 0 };
        let mut under = FixedModel { factor: 0.8, confidence: 0.7, calls: 0 };
        let gen = generator();
        assert_eq!(gen.generate(&[subject("p", "MLB")], &mut over)[0].direction, Direction::Over);
        assert_eq!(gen.generate(&[subject("p", "MLB")], &mut under)[0].direction, Direction::Under);
    }

    #[test]
    fn test_missing_ids_are_dropped() {
        let mut model = FixedModel { factor: 1.1, confidence: 0.7, calls: 0 };
        let mut bad = subject("", "NBA");
        bad.game_id = String::new();
        let opps = generator().generate(&[bad, subject("ok", "NHL")], &mut model);
        assert_eq!(opps.len(), 3);
        assert!(opps.iter().all(|o| o.subject_id == "ok"));
    }

    #[test]
    fn test_adjusted_line_snaps_to_half_points() {
        assert_eq!(adjusted_line(22.5, 0.0), 22.5);
        assert_eq!(adjusted_line(22.5, 1.0), 25.0); // 24.75 → 25.0
        assert_eq!(adjusted_line(1.0, -1.0), 1.0); // 0.9 → 1.0
        assert_eq!(adjusted_line(0.5, -1.0), 0.5);
        assert_eq!(adjusted_line(10.0, f64::NAN), 10.0);
    }

    #[test]
    fn test_expected_value_zero_line_is_neutral() {
        assert_eq!(expected_value(0.0, 5.0, 80.0), 0.0);
        assert_eq!(expected_value(20.0, 22.0, 50.0), 0.0);
        assert!((expected_value(20.0, 22.0, 75.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_kelly_fraction() {
        // -110 odds, 60% → f* = (0.909*0.6 - 0.4)/0.909 ≈ 0.16
        let f = kelly_fraction(0.6, 1.909, 1.0);
        assert!((f - 0.16).abs() < 0.01, "got {f}");
        assert_eq!(kelly_fraction(0.4, 1.909, 1.0), 0.0);
        assert_eq!(kelly_fraction(0.9, 1.0, 1.0), 0.0);
        assert!((kelly_fraction(0.6, 1.909, 0.25) - f * 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_override_replaces_sport() {
        let mut overrides = BTreeMap::new();
        overrides.insert("nba".to_string(), vec![StatLine::new("Pts+Reb+Ast", 35.5)]);
        let table = StatTable::with_overrides(&overrides);
        assert_eq!(table.stats_for("NBA").len(), 1);
        assert_eq!(table.stats_for("NFL").len(), 5);
    }
}
