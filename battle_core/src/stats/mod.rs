//! Stats - Immutable per-character combat definition

mod resistance;

pub use resistance::Resistances;

use crate::config::ConfigError;
use crate::types::Element;
use serde::{Deserialize, Serialize};

fn default_crit_damage() -> f64 {
    1.5
}

/// A character definition. Swapped as a whole; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Display name of the character
    #[serde(default)]
    pub name: String,
    pub max_health: u32,
    #[serde(default)]
    pub attack_damage: f64,
    /// Flat subtraction from incoming hits
    #[serde(default)]
    pub defense: f64,
    /// Chance in [0, 1]
    #[serde(default)]
    pub crit_rate: f64,
    /// Multiplier applied on crit (>= 1)
    #[serde(default = "default_crit_damage")]
    pub crit_damage: f64,
    #[serde(default)]
    pub attack_element: Element,
    #[serde(default)]
    pub defense_element: Element,
    #[serde(default)]
    pub resistance: Resistances,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            name: String::new(),
            max_health: 100,
            attack_damage: 10.0,
            defense: 0.0,
            crit_rate: 0.0,
            crit_damage: default_crit_damage(),
            attack_element: Element::None,
            defense_element: Element::None,
            resistance: Resistances::default(),
        }
    }
}

impl Stats {
    /// Create stats with the given health and attack
    pub fn new(max_health: u32, attack_damage: f64) -> Self {
        Stats {
            max_health,
            attack_damage,
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_defense(mut self, defense: f64) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_crit(mut self, rate: f64, damage: f64) -> Self {
        self.crit_rate = rate;
        self.crit_damage = damage;
        self
    }

    pub fn with_elements(mut self, attack: Element, defense: Element) -> Self {
        self.attack_element = attack;
        self.defense_element = defense;
        self
    }

    pub fn with_resistance(mut self, element: Element, value: f64) -> Self {
        self.resistance.set(element, value);
        self
    }

    /// Check the data model invariants
    pub fn validate(&self) -> Result<(), ConfigError> {
        let label = if self.name.is_empty() { "<unnamed>" } else { &self.name };

        if self.max_health < 1 {
            return Err(ConfigError::ValidationError(format!(
                "{}: max_health must be at least 1",
                label
            )));
        }
        if !(self.attack_damage.is_finite() && self.attack_damage >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "{}: attack_damage must be finite and >= 0 (got {})",
                label, self.attack_damage
            )));
        }
        if !(self.defense.is_finite() && self.defense >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "{}: defense must be finite and >= 0 (got {})",
                label, self.defense
            )));
        }
        if !(0.0..=1.0).contains(&self.crit_rate) {
            return Err(ConfigError::ValidationError(format!(
                "{}: crit_rate must be within [0, 1] (got {})",
                label, self.crit_rate
            )));
        }
        if !(self.crit_damage.is_finite() && self.crit_damage >= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "{}: crit_damage must be >= 1 (got {})",
                label, self.crit_damage
            )));
        }
        if let Some(element) = self.resistance.first_invalid() {
            return Err(ConfigError::ValidationError(format!(
                "{}: resistance for {:?} must be finite and >= 0",
                label, element
            )));
        }
        Ok(())
    }
}
