//! Health - Current/maximum hit points for one combatant

mod regen;

pub use regen::Regeneration;

use crate::stats::Stats;
use serde::{Deserialize, Serialize};

/// What a health mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthChange {
    pub before: u32,
    pub after: u32,
    /// True only on the mutation that brought health to zero
    pub died: bool,
}

impl HealthChange {
    fn unchanged(current: u32) -> Self {
        HealthChange {
            before: current,
            after: current,
            died: false,
        }
    }

    /// Amount of health removed (0 for heals)
    pub fn lost(&self) -> u32 {
        self.before.saturating_sub(self.after)
    }

    /// Amount of health restored (0 for damage)
    pub fn gained(&self) -> u32 {
        self.after.saturating_sub(self.before)
    }
}

/// Hit point value object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    current: u32,
    max: u32,
}

impl Health {
    /// Create health at full from a stats definition
    pub fn from_stats(stats: &Stats) -> Self {
        let max = stats.max_health.max(1);
        Health { current: max, max }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Fraction of max health remaining, in [0, 1]
    pub fn fraction(&self) -> f64 {
        self.current as f64 / self.max as f64
    }

    /// Replace the maximum from new stats and heal to full
    pub fn apply_stats(&mut self, stats: &Stats) -> HealthChange {
        let before = self.current;
        self.max = stats.max_health.max(1);
        self.current = self.max;
        HealthChange {
            before,
            after: self.current,
            died: false,
        }
    }

    /// Subtract damage, never below zero
    ///
    /// `died` is set exactly once, on the hit that reaches zero. Any call
    /// on a dead combatant is a no-op.
    pub fn apply_damage(&mut self, amount: u32) -> HealthChange {
        if self.is_dead() {
            return HealthChange::unchanged(0);
        }

        let before = self.current;
        self.current = self.current.saturating_sub(amount);

        HealthChange {
            before,
            after: self.current,
            died: self.current == 0,
        }
    }

    /// Restore health, never above max. The dead stay dead.
    pub fn apply_heal(&mut self, amount: u32) -> HealthChange {
        if self.is_dead() {
            return HealthChange::unchanged(0);
        }

        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        HealthChange {
            before,
            after: self.current,
            died: false,
        }
    }

    /// Set current health directly, clamped to [0, max] (used on load)
    pub fn restore_current(&mut self, current: u32) {
        self.current = current.min(self.max);
    }
}
