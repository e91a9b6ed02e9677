//! Combatant - Stable identity owning the live Stats and Health

use crate::health::{Health, HealthChange, Regeneration};
use crate::stats::Stats;
use crate::types::{CombatantId, Element, Team};
use serde::{Deserialize, Serialize};

/// The action a combatant takes on its turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionProfile {
    /// Registered minigame id; `None` takes the direct-damage path
    #[serde(default)]
    pub minigame: Option<String>,
    /// Explicit power; non-positive falls back to the attacker's attack damage
    #[serde(default)]
    pub raw_damage: f64,
    /// Element override for the hit
    #[serde(default)]
    pub element: Option<Element>,
}

/// One participant in the turn order
#[derive(Debug, Clone)]
pub struct Combatant {
    id: CombatantId,
    pub name: String,
    pub team: Team,
    pub action: ActionProfile,
    pub regen: Regeneration,
    /// Switchable character definitions
    characters: Vec<Stats>,
    active_character: Option<usize>,
    stats: Option<Stats>,
    health: Option<Health>,
    /// Bumped on every stats application
    stats_version: u32,
}

impl Combatant {
    /// Create a combatant and apply the first character, if any
    pub fn new(id: impl Into<CombatantId>, name: &str, team: Team, characters: Vec<Stats>) -> Self {
        let mut combatant = Combatant {
            id: id.into(),
            name: name.to_string(),
            team,
            action: ActionProfile::default(),
            regen: Regeneration::default(),
            characters,
            active_character: None,
            stats: None,
            health: None,
            stats_version: 0,
        };
        if !combatant.characters.is_empty() {
            combatant.active_character = Some(0);
            let first = combatant.characters[0].clone();
            combatant.apply_stats(first);
        }
        combatant
    }

    /// Single-character convenience constructor
    pub fn with_stats(id: impl Into<CombatantId>, team: Team, stats: Stats) -> Self {
        let id = id.into();
        let name = if stats.name.is_empty() {
            id.0.clone()
        } else {
            stats.name.clone()
        };
        Self::new(id, &name, team, vec![stats])
    }

    pub fn with_action(mut self, action: ActionProfile) -> Self {
        self.action = action;
        self
    }

    pub fn with_regen(mut self, per_second: f64) -> Self {
        self.regen = Regeneration::new(per_second);
        self
    }

    pub fn id(&self) -> &CombatantId {
        &self.id
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn health(&self) -> Option<&Health> {
        self.health.as_ref()
    }

    pub fn stats_version(&self) -> u32 {
        self.stats_version
    }

    pub fn characters(&self) -> &[Stats] {
        &self.characters
    }

    pub fn active_character(&self) -> Option<usize> {
        self.active_character
    }

    /// Has stats and is above zero health
    pub fn is_alive(&self) -> bool {
        self.health.as_ref().is_some_and(|h| !h.is_dead())
    }

    /// Has stats and is at zero health
    pub fn is_dead(&self) -> bool {
        self.health.as_ref().is_some_and(|h| h.is_dead())
    }

    /// Replace the live stats; health resets to the new maximum
    pub fn apply_stats(&mut self, stats: Stats) -> HealthChange {
        let change = match self.health.as_mut() {
            Some(health) => health.apply_stats(&stats),
            None => {
                let health = Health::from_stats(&stats);
                let change = HealthChange {
                    before: 0,
                    after: health.current(),
                    died: false,
                };
                self.health = Some(health);
                change
            }
        };
        self.stats = Some(stats);
        self.stats_version += 1;
        change
    }

    /// Switch to another character from the roster
    ///
    /// Returns `None` when the index is out of range.
    pub fn switch_character(&mut self, index: usize) -> Option<HealthChange> {
        let stats = self.characters.get(index)?.clone();
        self.active_character = Some(index);
        Some(self.apply_stats(stats))
    }

    /// Apply final damage; a no-op without stats or when already dead
    pub fn apply_damage(&mut self, amount: u32) -> Option<HealthChange> {
        self.health.as_mut().map(|h| h.apply_damage(amount))
    }

    pub fn apply_heal(&mut self, amount: u32) -> Option<HealthChange> {
        self.health.as_mut().map(|h| h.apply_heal(amount))
    }

    /// Advance passive regeneration by `delta` seconds
    pub fn tick_regen(&mut self, delta: f64) -> Option<HealthChange> {
        let health = self.health.as_mut()?;
        self.regen.tick(health, delta)
    }

    /// Re-adopt a saved character and stats version (used on load)
    ///
    /// Returns `false` when the roster has no such index.
    pub(crate) fn restore_character(&mut self, index: usize, stats_version: u32) -> bool {
        if self.switch_character(index).is_none() {
            return false;
        }
        self.stats_version = stats_version;
        true
    }

    /// Overwrite current health from a saved snapshot
    pub(crate) fn restore_health(&mut self, current: u32) {
        if let Some(health) = self.health.as_mut() {
            health.restore_current(current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knight() -> Stats {
        Stats::new(120, 15.0).with_name("Knight")
    }

    fn mage() -> Stats {
        Stats::new(60, 30.0).with_name("Mage")
    }

    #[test]
    fn test_first_character_applied() {
        let c = Combatant::new("p1", "Party", Team::Player, vec![knight(), mage()]);
        assert_eq!(c.stats().unwrap().name, "Knight");
        assert_eq!(c.health().unwrap().current(), 120);
        assert_eq!(c.stats_version(), 1);
        assert_eq!(c.active_character(), Some(0));
        assert!(c.is_alive());
    }

    #[test]
    fn test_empty_roster_has_no_stats() {
        let c = Combatant::new("ghost", "Ghost", Team::Enemy, vec![]);
        assert!(c.stats().is_none());
        assert!(c.health().is_none());
        assert!(!c.is_alive());
        assert!(!c.is_dead());
    }

    #[test]
    fn test_switch_keeps_identity_and_heals() {
        let mut c = Combatant::new("p1", "Party", Team::Player, vec![knight(), mage()]);
        c.apply_damage(100);
        let change = c.switch_character(1).unwrap();
        assert_eq!(change.before, 20);
        assert_eq!(change.after, 60);
        assert_eq!(c.id(), &CombatantId::from("p1"));
        assert_eq!(c.stats_version(), 2);
        assert!(c.switch_character(5).is_none());
        assert_eq!(c.stats_version(), 2);
    }

    #[test]
    fn test_restore_character_adopts_saved_version() {
        let mut c = Combatant::new("p1", "Party", Team::Player, vec![knight(), mage()]);
        assert!(c.restore_character(1, 4));
        assert_eq!(c.stats().unwrap().name, "Mage");
        assert_eq!(c.active_character(), Some(1));
        assert_eq!(c.stats_version(), 4);

        assert!(!c.restore_character(2, 9));
        assert_eq!(c.stats_version(), 4);
    }

    #[test]
    fn test_damage_without_stats_is_noop() {
        let mut c = Combatant::new("ghost", "Ghost", Team::Enemy, vec![]);
        assert!(c.apply_damage(10).is_none());
    }

    #[test]
    fn test_with_stats_uses_character_name() {
        let c = Combatant::with_stats("e1", Team::Enemy, mage());
        assert_eq!(c.name, "Mage");
        let c = Combatant::with_stats("e2", Team::Enemy, Stats::new(5, 1.0));
        assert_eq!(c.name, "e2");
    }
}
