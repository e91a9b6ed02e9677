//! Per-element resistance scalars
//!
//! Layered on top of the elemental triangle. A scalar of 1.0 leaves the
//! hit unchanged, 0.5 halves it, 0.0 makes the character immune.

use crate::types::Element;
use serde::{Deserialize, Serialize};

fn one() -> f64 {
    1.0
}

/// Resistance multiplier for each attack element (defaults to 1.0)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resistances {
    #[serde(default = "one")]
    pub none: f64,
    #[serde(default = "one")]
    pub fire: f64,
    #[serde(default = "one")]
    pub water: f64,
    #[serde(default = "one")]
    pub grass: f64,
    #[serde(default = "one")]
    pub dark: f64,
    #[serde(default = "one")]
    pub light: f64,
}

impl Default for Resistances {
    fn default() -> Self {
        Resistances {
            none: 1.0,
            fire: 1.0,
            water: 1.0,
            grass: 1.0,
            dark: 1.0,
            light: 1.0,
        }
    }
}

impl Resistances {
    /// Get the scalar for an attack element
    pub fn get(&self, element: Element) -> f64 {
        match element {
            Element::None => self.none,
            Element::Fire => self.fire,
            Element::Water => self.water,
            Element::Grass => self.grass,
            Element::Dark => self.dark,
            Element::Light => self.light,
        }
    }

    /// Set the scalar for an attack element
    pub fn set(&mut self, element: Element, value: f64) {
        match element {
            Element::None => self.none = value,
            Element::Fire => self.fire = value,
            Element::Water => self.water = value,
            Element::Grass => self.grass = value,
            Element::Dark => self.dark = value,
            Element::Light => self.light = value,
        }
    }

    /// Builder-style setter
    pub fn with(mut self, element: Element, value: f64) -> Self {
        self.set(element, value);
        self
    }

    /// First element whose scalar is negative or non-finite
    pub fn first_invalid(&self) -> Option<Element> {
        Element::all()
            .iter()
            .copied()
            .find(|e| !(self.get(*e).is_finite() && self.get(*e) >= 0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_neutral() {
        let res = Resistances::default();
        for element in Element::all() {
            assert!((res.get(*element) - 1.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let res: Resistances = toml::from_str("fire = 0.5").unwrap();
        assert!((res.fire - 0.5).abs() < f64::EPSILON);
        assert!((res.water - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_first_invalid() {
        assert_eq!(Resistances::default().first_invalid(), None);
        let res = Resistances::default().with(Element::Dark, -0.1);
        assert_eq!(res.first_invalid(), Some(Element::Dark));
        let res = Resistances::default().with(Element::Light, f64::NAN);
        assert_eq!(res.first_invalid(), Some(Element::Light));
    }
}
