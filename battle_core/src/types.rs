//! Core types shared across the battle loop

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a combatant (survives character switches)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub String);

impl From<&str> for CombatantId {
    fn from(s: &str) -> Self {
        CombatantId(s.to_string())
    }
}

impl From<String> for CombatantId {
    fn from(s: String) -> Self {
        CombatantId(s)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Element carried by attacks and defenders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Element {
    #[default]
    None,
    Fire,
    Water,
    Grass,
    Dark,
    Light,
}

impl Element {
    /// Get all elements
    pub fn all() -> &'static [Element] {
        &[
            Element::None,
            Element::Fire,
            Element::Water,
            Element::Grass,
            Element::Dark,
            Element::Light,
        ]
    }
}

/// Side a combatant fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Player,
    Enemy,
}

/// Turn state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnState {
    Idle,
    ActionSelecting,
    ActionResolving,
    Suspended,
    TurnComplete,
}

impl TurnState {
    /// Whether `next` is a legal transition from this state
    pub fn can_transition_to(self, next: TurnState) -> bool {
        use TurnState::*;
        matches!(
            (self, next),
            (Idle, ActionSelecting)
                | (ActionSelecting, ActionResolving)
                // skipped action
                | (ActionSelecting, TurnComplete)
                | (ActionResolving, Suspended)
                | (Suspended, ActionResolving)
                | (ActionResolving, TurnComplete)
                | (TurnComplete, Idle)
        )
    }
}

/// Three-valued result of a skill check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Fail,
    Success,
    Perfect,
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Fail => f.write_str("Fail"),
            ActionOutcome::Success => f.write_str("Success"),
            ActionOutcome::Perfect => f.write_str("Perfect"),
        }
    }
}

/// How a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleResult {
    Victory(Team),
    Draw,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_state_transitions() {
        use TurnState::*;
        assert!(Idle.can_transition_to(ActionSelecting));
        assert!(ActionResolving.can_transition_to(Suspended));
        assert!(Suspended.can_transition_to(ActionResolving));
        assert!(ActionSelecting.can_transition_to(TurnComplete));

        assert!(!Idle.can_transition_to(TurnComplete));
        assert!(!Suspended.can_transition_to(TurnComplete));
        assert!(!TurnComplete.can_transition_to(ActionResolving));
    }

    #[test]
    fn test_element_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            element: Element,
        }
        let parsed: Wrapper = toml::from_str("element = \"grass\"").unwrap();
        assert_eq!(parsed.element, Element::Grass);
    }
}
