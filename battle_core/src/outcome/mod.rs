//! OutcomeResolver - Skill check tier to damage multiplier

use crate::config::ConfigError;
use crate::types::ActionOutcome;
use serde::{Deserialize, Serialize};

fn default_fail() -> f64 {
    0.0
}
fn default_success() -> f64 {
    1.0
}
fn default_perfect() -> f64 {
    1.5
}

/// Multiplier per outcome tier
///
/// A multiplier of 0 gates the action entirely: the damage engine is not
/// run and nothing is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeResolver {
    #[serde(default = "default_fail")]
    pub fail: f64,
    #[serde(default = "default_success")]
    pub success: f64,
    #[serde(default = "default_perfect")]
    pub perfect: f64,
}

impl Default for OutcomeResolver {
    fn default() -> Self {
        OutcomeResolver {
            fail: default_fail(),
            success: default_success(),
            perfect: default_perfect(),
        }
    }
}

impl OutcomeResolver {
    pub fn new(fail: f64, success: f64, perfect: f64) -> Self {
        OutcomeResolver {
            fail,
            success,
            perfect,
        }
    }

    pub fn to_multiplier(&self, outcome: ActionOutcome) -> f64 {
        match outcome {
            ActionOutcome::Fail => self.fail,
            ActionOutcome::Success => self.success,
            ActionOutcome::Perfect => self.perfect,
        }
    }

    /// Whether the damage engine should run at all for this outcome
    pub fn deals_damage(&self, outcome: ActionOutcome) -> bool {
        self.to_multiplier(outcome) > 0.0
    }

    /// Scale a resolved hit by the outcome tier
    ///
    /// Zero for gated outcomes, otherwise at least 1.
    pub fn scale(&self, outcome: ActionOutcome, damage: u32) -> u32 {
        let multiplier = self.to_multiplier(outcome);
        if multiplier <= 0.0 {
            return 0;
        }
        let scaled = (damage as f64 * multiplier).round();
        if scaled >= 1.0 {
            scaled.min(u32::MAX as f64) as u32
        } else {
            1
        }
    }

    /// Multipliers must be finite, non-negative and ordered Fail <= Success <= Perfect
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("fail", self.fail),
            ("success", self.success),
            ("perfect", self.perfect),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "outcome multiplier `{}` must be finite and >= 0 (got {})",
                    name, value
                )));
            }
        }
        if self.fail > self.success || self.success > self.perfect {
            return Err(ConfigError::ValidationError(
                "outcome multipliers must satisfy fail <= success <= perfect".to_string(),
            ));
        }
        if self.perfect < 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "perfect multiplier must be >= 1.0 (got {})",
                self.perfect
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_multipliers() {
        let resolver = OutcomeResolver::default();
        assert_eq!(resolver.to_multiplier(ActionOutcome::Fail), 0.0);
        assert_eq!(resolver.to_multiplier(ActionOutcome::Success), 1.0);
        assert_eq!(resolver.to_multiplier(ActionOutcome::Perfect), 1.5);
        assert!(resolver.validate().is_ok());
    }

    #[test]
    fn test_fail_gates_damage() {
        let resolver = OutcomeResolver::default();
        assert!(!resolver.deals_damage(ActionOutcome::Fail));
        assert_eq!(resolver.scale(ActionOutcome::Fail, 999), 0);
    }

    #[test]
    fn test_perfect_bonus() {
        let resolver = OutcomeResolver::default();
        assert_eq!(resolver.scale(ActionOutcome::Success, 23), 23);
        // 34.5 rounds to 35
        assert_eq!(resolver.scale(ActionOutcome::Perfect, 23), 35);
    }

    #[test]
    fn test_chip_damage_never_zero() {
        let resolver = OutcomeResolver::new(0.1, 1.0, 1.5);
        assert!(resolver.deals_damage(ActionOutcome::Fail));
        assert_eq!(resolver.scale(ActionOutcome::Fail, 3), 1);
        assert_eq!(resolver.scale(ActionOutcome::Fail, 40), 4);
    }

    #[test]
    fn test_validation() {
        assert!(OutcomeResolver::new(-0.1, 1.0, 1.5).validate().is_err());
        assert!(OutcomeResolver::new(0.0, 2.0, 1.5).validate().is_err());
        assert!(OutcomeResolver::new(0.0, 0.5, 0.8).validate().is_err());
        assert!(OutcomeResolver::new(0.2, 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_parse_partial_table() {
        let resolver: OutcomeResolver = toml::from_str("perfect = 2.0").unwrap();
        assert_eq!(resolver.fail, 0.0);
        assert_eq!(resolver.perfect, 2.0);
    }
}
