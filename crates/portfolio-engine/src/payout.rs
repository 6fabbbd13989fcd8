//! Payout multiplier table for pick-N lineups.

use std::collections::BTreeMap;

use common::config::{PayoutConfig, MAX_LEGS, MIN_LEGS};
use common::{Error, PayoutQuote};

#[derive(Debug, Clone, PartialEq)]
pub struct PayoutTable {
    multipliers: BTreeMap<usize, f64>,
}

impl Default for PayoutTable {
    fn default() -> Self {
        let multipliers = [(2, 3.0), (3, 5.0), (4, 10.0), (5, 20.0), (6, 50.0)]
            .into_iter()
            .collect();
        Self { multipliers }
    }
}

impl PayoutTable {
    /// Build from config tiers. Tiers outside 2–6 legs or with a
    /// non-positive multiplier are rejected.
    pub fn from_config(config: &PayoutConfig) -> Result<Self, Error> {
        let mut multipliers = BTreeMap::new();
        for tier in &config.tiers {
            if !(MIN_LEGS..=MAX_LEGS).contains(&tier.legs) {
                return Err(Error::Config(format!(
                    "payout tier for {} legs is outside {}-{}",
                    tier.legs, MIN_LEGS, MAX_LEGS
                )));
            }
            if !tier.multiplier.is_finite() || tier.multiplier <= 0.0 {
                return Err(Error::Config(format!(
                    "payout multiplier for {} legs must be > 0",
                    tier.legs
                )));
            }
            multipliers.insert(tier.legs, tier.multiplier);
        }
        if multipliers.is_empty() {
            return Err(Error::Config("payout table is empty".into()));
        }
        Ok(Self { multipliers })
    }

    pub fn multiplier(&self, legs: usize) -> Result<f64, Error> {
        self.multipliers.get(&legs).copied().ok_or_else(|| {
            Error::Validation(format!(
                "no payout for a {legs}-pick lineup (supported: {:?})",
                self.multipliers.keys().collect::<Vec<_>>()
            ))
        })
    }

    pub fn quote(&self, stake: f64, legs: usize) -> Result<PayoutQuote, Error> {
        if !stake.is_finite() || stake <= 0.0 {
            return Err(Error::Validation(format!(
                "entry amount must be greater than 0 (got {stake})"
            )));
        }
        let multiplier = self.multiplier(legs)?;
        Ok(PayoutQuote {
            stake,
            legs,
            multiplier,
            payout: stake * multiplier,
        })
    }

    /// Like `quote`, but rejects stakes above the risk profile's exposure cap.
    pub fn quote_with_limit(
        &self,
        stake: f64,
        legs: usize,
        max_exposure: f64,
    ) -> Result<PayoutQuote, Error> {
        if !max_exposure.is_finite() || max_exposure <= 0.0 {
            return Err(Error::Config(format!(
                "max exposure must be a finite amount > 0 (got {max_exposure})"
            )));
        }
        if stake > max_exposure {
            return Err(Error::Validation(format!(
                "entry amount {stake:.2} exceeds max exposure {max_exposure:.2}"
            )));
        }
        self.quote(stake, legs)
    }
}
