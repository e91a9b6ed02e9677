//! Elemental triangle - attack element vs defense element multipliers
//!
//! Fire -> Grass -> Water -> Fire is a cycle: attacking down the cycle is
//! strong (x1.5), attacking up it is weak (x0.75).
//!
//! Dark and Light are strong against each other (x1.5 both ways) and have
//! no weak pairing. Anything involving `None` is neutral.

use crate::types::Element;

/// Multiplier constants
pub mod constants {
    /// Attacking an element you beat
    pub const ADVANTAGE: f64 = 1.5;

    /// Attacking an element that beats you (Fire/Water/Grass only)
    pub const DISADVANTAGE: f64 = 0.75;

    pub const NEUTRAL: f64 = 1.0;
}

use constants::{ADVANTAGE, DISADVANTAGE, NEUTRAL};

/// Static lookup for the elemental triangle
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementTable;

impl ElementTable {
    /// Multiplier for `attack` hitting `defense`
    pub fn multiplier(attack: Element, defense: Element) -> f64 {
        use Element::*;
        match (attack, defense) {
            (Fire, Grass) | (Grass, Water) | (Water, Fire) => ADVANTAGE,
            (Grass, Fire) | (Water, Grass) | (Fire, Water) => DISADVANTAGE,
            (Dark, Light) | (Light, Dark) => ADVANTAGE,
            _ => NEUTRAL,
        }
    }

    /// Whether `attack` is strong against `defense`
    pub fn is_advantage(attack: Element, defense: Element) -> bool {
        Self::multiplier(attack, defense) > NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Element::*;

    #[test]
    fn test_cycle_advantages() {
        assert_eq!(ElementTable::multiplier(Fire, Grass), 1.5);
        assert_eq!(ElementTable::multiplier(Grass, Water), 1.5);
        assert_eq!(ElementTable::multiplier(Water, Fire), 1.5);
    }

    #[test]
    fn test_cycle_disadvantages_are_reciprocal() {
        for (a, b) in [(Fire, Grass), (Grass, Water), (Water, Fire)] {
            assert_eq!(ElementTable::multiplier(a, b), 1.5);
            assert_eq!(ElementTable::multiplier(b, a), 0.75);
        }
    }

    #[test]
    fn test_dark_light_mutually_strong() {
        assert_eq!(ElementTable::multiplier(Dark, Light), 1.5);
        assert_eq!(ElementTable::multiplier(Light, Dark), 1.5);
        // no weak pairing
        assert_eq!(ElementTable::multiplier(Dark, Dark), 1.0);
        assert_eq!(ElementTable::multiplier(Light, Light), 1.0);
    }

    #[test]
    fn test_cross_group_is_neutral() {
        assert_eq!(ElementTable::multiplier(Fire, Dark), 1.0);
        assert_eq!(ElementTable::multiplier(Light, Water), 1.0);
        assert_eq!(ElementTable::multiplier(Grass, Light), 1.0);
    }

    #[test]
    fn test_none_is_neutral_everywhere() {
        for element in Element::all() {
            assert_eq!(ElementTable::multiplier(None, *element), 1.0);
            assert_eq!(ElementTable::multiplier(*element, None), 1.0);
        }
    }

    #[test]
    fn test_same_element_is_neutral() {
        for element in Element::all() {
            assert_eq!(ElementTable::multiplier(*element, *element), 1.0);
        }
    }

    #[test]
    fn test_all_36_pairs_classified() {
        let mut advantage = 0;
        let mut disadvantage = 0;
        for a in Element::all() {
            for d in Element::all() {
                let m = ElementTable::multiplier(*a, *d);
                if m == ADVANTAGE {
                    advantage += 1;
                } else if m == DISADVANTAGE {
                    disadvantage += 1;
                }
            }
        }
        assert_eq!(advantage, 5);
        assert_eq!(disadvantage, 3);
        assert!(ElementTable::is_advantage(Light, Dark));
        assert!(!ElementTable::is_advantage(Fire, Water));
    }
}
