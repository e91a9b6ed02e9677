//! battle_core - Turn-based skill-check combat core
//!
//! This library provides:
//! - DamageEngine: Fixed-order damage pipeline with the elemental triangle
//! - Health / Combatant: Live stats, character switching, regeneration
//! - PauseCoordinator: Reference-counted suspension gate
//! - MinigameRunner: Deadline-bounded skill checks behind a registry
//! - TurnScheduler: Cyclic turn order driving the per-turn state machine
//! - BattleSession: Per-battle context replacing global managers

pub mod clock;
pub mod combatant;
pub mod config;
pub mod damage;
pub mod element;
pub mod events;
pub mod health;
pub mod minigame;
pub mod outcome;
pub mod pause;
pub mod persistence;
pub mod prelude;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod types;

// Re-export core types for convenience
pub use clock::{BattleClock, SpeedControl, SpeedError, WaitStep};
pub use combatant::{ActionProfile, Combatant};
pub use config::{default_battle, BattleConfig, BattleSettings, CombatantConfig, ConfigError, Validate};
pub use damage::{resolve_damage, resolve_damage_with_rng, DamageRoll};
pub use element::ElementTable;
pub use events::{BattleEvent, ChannelPresenter, EventDispatcher, Presentation, SkipReason, TracingPresenter};
pub use health::{Health, HealthChange, Regeneration};
pub use minigame::{InputHub, Minigame, MinigameContext, MinigameInput, MinigameRegistry, MinigameRunner};
pub use outcome::OutcomeResolver;
pub use pause::{PauseCoordinator, PauseError, PauseGuard, PauseSource};
pub use persistence::{BattleSnapshot, CombatantSnapshot, SnapshotError, SnapshotStore};
pub use scheduler::{SchedulerError, TurnScheduler};
pub use session::{BattleSession, BattleSessionBuilder};
pub use stats::{Resistances, Stats};
pub use types::{ActionOutcome, BattleResult, CombatantId, Element, Team, TurnState};
