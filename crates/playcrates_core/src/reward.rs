//! # Reward Definitions
//!
//! One possible prize inside a crate: the item handed out, its relative
//! selection weight and the console commands that run on delivery.

use serde::{Deserialize, Serialize};

use crate::error::{CrateError, CrateResult};
use crate::selector::Weighted;

/// Weight given to rewards registered without an explicit one.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// A single entry in a crate's reward pool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardDefinition<P> {
    /// The item handed to the requester.
    pub payload: P,
    #[serde(default = "default_weight")]
    weight: f64,
    /// Console commands run with elevated privilege, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub commands: Vec<String>,
}

impl<P> RewardDefinition<P> {
    /// Creates a reward with the default weight and no commands.
    #[must_use]
    pub const fn new(payload: P) -> Self {
        Self {
            payload,
            weight: DEFAULT_WEIGHT,
            commands: Vec::new(),
        }
    }

    /// Sets the selection weight.
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidWeight` for negative, NaN or infinite
    /// weights.
    pub fn with_weight(mut self, weight: f64) -> CrateResult<Self> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(CrateError::InvalidWeight(weight));
        }
        self.weight = weight;
        Ok(self)
    }

    /// Appends a side command.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    /// The relative selection weight.
    #[inline]
    #[must_use]
    pub const fn weight(&self) -> f64 {
        self.weight
    }

    /// Checks invariants on data that bypassed the builders (e.g. loaded
    /// from disk).
    ///
    /// # Errors
    ///
    /// Returns `CrateError::InvalidWeight` if the stored weight is invalid.
    pub fn validate(&self) -> CrateResult<()> {
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(CrateError::InvalidWeight(self.weight));
        }
        Ok(())
    }
}

const fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

impl<P> Weighted for RewardDefinition<P> {
    fn weight(&self) -> f64 {
        self.weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let reward = RewardDefinition::new("diamond");
        assert!((reward.weight() - 1.0).abs() < f64::EPSILON);
        assert!(reward.commands.is_empty());
    }

    #[test]
    fn test_weight_validation() {
        assert!(RewardDefinition::new("a").with_weight(0.0).is_ok());
        assert!(RewardDefinition::new("a").with_weight(2.5).is_ok());
        assert_eq!(
            RewardDefinition::new("a").with_weight(-1.0),
            Err(CrateError::InvalidWeight(-1.0))
        );
        assert!(RewardDefinition::new("a").with_weight(f64::NAN).is_err());
        assert!(RewardDefinition::new("a").with_weight(f64::INFINITY).is_err());
    }

    #[test]
    fn test_commands_keep_order() {
        let reward = RewardDefinition::new("a")
            .with_command("say first")
            .with_command("say second");
        assert_eq!(reward.commands, vec!["say first", "say second"]);
    }

    #[test]
    fn test_validate_loaded_data() {
        let loaded: RewardDefinition<String> =
            toml::from_str("payload = \"x\"\nweight = -2.0").unwrap();
        assert!(loaded.validate().is_err());
    }
}
