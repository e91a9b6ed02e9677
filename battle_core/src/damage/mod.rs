//! Damage engine - base damage, crit, defense, elements and resistance

mod calculation;
mod roll;

pub use calculation::{resolve_damage, resolve_damage_with_rng, DAMAGE_FLOOR};
pub use roll::DamageRoll;
