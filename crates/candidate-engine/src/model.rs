//! Prediction model seam.
//!
//! The generator asks a `PredictionModel` for a projection on every
//! (subject, market) pair. Real model calls and test doubles both plug in
//! here; scoring and selection never touch randomness themselves.

use common::Subject;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Raw projection for one (subject, market) pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOutput {
    /// Projected stat value.
    pub prediction: f64,
    /// Model confidence as a 0..=1 probability.
    pub confidence_fraction: f64,
    /// Share of ensemble members agreeing on direction, 0..=1.
    pub model_consensus: f64,
}

impl ModelOutput {
    /// Replace anything non-finite with neutral values so downstream
    /// math never sees NaN.
    pub fn sanitized(self, line: f64) -> Self {
        let prediction = if self.prediction.is_finite() {
            self.prediction
        } else {
            line
        };
        let confidence_fraction = if self.confidence_fraction.is_finite() {
            self.confidence_fraction.clamp(0.0, 1.0)
        } else {
            0.5
        };
        let model_consensus = if self.model_consensus.is_finite() {
            self.model_consensus.clamp(0.0, 1.0)
        } else {
            0.5
        };
        Self {
            prediction,
            confidence_fraction,
            model_consensus,
        }
    }
}

pub trait PredictionModel: Send {
    fn name(&self) -> &str;

    fn predict(&mut self, subject: &Subject, market: &str, line: f64) -> ModelOutput;
}

/// Seedable stand-in for a real projection service.
pub struct SeededModel {
    rng: StdRng,
    /// Max relative deviation of the projection from the line.
    spread: f64,
}

impl SeededModel {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            spread: 0.15,
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            spread: 0.15,
        }
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::new(s),
            None => Self::from_entropy(),
        }
    }
}

impl PredictionModel for SeededModel {
    fn name(&self) -> &str {
        "seeded"
    }

    fn predict(&mut self, subject: &Subject, _market: &str, line: f64) -> ModelOutput {
        let noise = self.rng.gen_range(-self.spread..=self.spread);
        let trend = subject.recent_form.clamp(-1.0, 1.0) * 0.05;
        ModelOutput {
            prediction: line * (1.0 + noise + trend),
            confidence_fraction: self.rng.gen_range(0.52..0.90),
            model_consensus: self.rng.gen_range(0.4..=1.0),
        }
    }
}
