//! DamageRoll - Breakdown of a single damage resolution

use crate::types::Element;
use serde::{Deserialize, Serialize};

/// Every intermediate value of one resolution, in pipeline order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageRoll {
    /// Element the hit was resolved with
    pub element: Element,
    /// Raw damage or the attacker's attack damage fallback
    pub base: f64,
    pub is_critical: bool,
    /// After the crit multiplier (equal to base when no crit)
    pub after_crit: f64,
    /// After flat defense, clamped to at least 1.0
    pub after_defense: f64,
    /// Elemental triangle factor
    pub element_multiplier: f64,
    /// Defender's resistance scalar for the element
    pub resistance: f64,
    /// Value before rounding
    pub unrounded: f64,
    /// Final positive integer damage
    pub amount: u32,
}

impl DamageRoll {
    /// Damage absorbed by defense (before the floor clamp)
    pub fn defense_absorbed(&self) -> f64 {
        (self.after_crit - self.after_defense).max(0.0)
    }

    /// Get a summary string
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} damage", self.amount)];

        if self.is_critical {
            parts.push("CRIT".to_string());
        }

        if self.element_multiplier > 1.0 {
            parts.push(format!("{:?} advantage", self.element));
        } else if self.element_multiplier < 1.0 {
            parts.push(format!("{:?} disadvantage", self.element));
        }

        if (self.resistance - 1.0).abs() > f64::EPSILON {
            parts.push(format!("x{:.2} resist", self.resistance));
        }

        parts.join(", ")
    }
}
