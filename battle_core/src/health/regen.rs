//! Passive regeneration ticking

use super::{Health, HealthChange};
use serde::{Deserialize, Serialize};

/// Heals a fixed amount per second of (scaled) battle time
///
/// Fractional healing carries over between ticks so slow regen still lands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Regeneration {
    pub per_second: f64,
    #[serde(skip)]
    carry: f64,
}

impl Regeneration {
    pub fn new(per_second: f64) -> Self {
        Regeneration {
            per_second: per_second.max(0.0),
            carry: 0.0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.per_second > 0.0
    }

    /// Advance by `delta` seconds and heal whole points
    ///
    /// Returns `None` when nothing was healed.
    pub fn tick(&mut self, health: &mut Health, delta: f64) -> Option<HealthChange> {
        if !self.is_active() || health.is_dead() || delta <= 0.0 {
            return None;
        }

        if health.current() >= health.max() {
            self.carry = 0.0;
            return None;
        }

        self.carry += self.per_second * delta;
        let whole = self.carry.floor();
        if whole < 1.0 {
            return None;
        }
        self.carry -= whole;

        let change = health.apply_heal(whole.min(u32::MAX as f64) as u32);
        (change.gained() > 0).then_some(change)
    }
}
