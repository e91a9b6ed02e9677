//! Prelude module for convenient imports
//!
//! ```rust
//! use battle_core::prelude::*;
//! ```

// Core types
pub use crate::types::{ActionOutcome, BattleResult, CombatantId, Element, Team, TurnState};
pub use crate::stats::{Resistances, Stats};

// Combatants
pub use crate::combatant::{ActionProfile, Combatant};
pub use crate::health::{Health, HealthChange};

// Damage
pub use crate::damage::{resolve_damage, resolve_damage_with_rng, DamageRoll};
pub use crate::outcome::OutcomeResolver;

// Battle loop
pub use crate::pause::{PauseCoordinator, PauseSource};
pub use crate::scheduler::TurnScheduler;
pub use crate::session::BattleSession;
pub use crate::events::{BattleEvent, Presentation};

// Minigames
pub use crate::minigame::{InputHub, Minigame, MinigameContext, MinigameInput, MinigameRegistry};

// Config
pub use crate::config::{default_battle, BattleConfig};
