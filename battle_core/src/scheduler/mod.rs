//! TurnScheduler - Cyclic turn order and the per-turn state machine
//!
//! One combatant acts at a time:
//! `Idle -> ActionSelecting -> ActionResolving (<-> Suspended) -> TurnComplete -> Idle`.
//! Combatants that die are dropped from the order at the start of the
//! next turn, never in the middle of one.

mod turn;

use crate::clock::SpeedError;
use crate::combatant::Combatant;
use crate::config::{BattleConfig, ConfigError};
use crate::events::BattleEvent;
use crate::persistence::{BattleSnapshot, CombatantSnapshot, SnapshotError, SnapshotStore};
use crate::session::BattleSession;
use crate::types::{BattleResult, CombatantId, TurnState};
use std::collections::HashSet;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

/// Errors from collaborator calls into a running scheduler
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    #[error("unknown combatant `{0}`")]
    UnknownCombatant(CombatantId),
    #[error("combatant `{id}` has no character at index {index}")]
    NoSuchCharacter { id: CombatantId, index: usize },
    #[error("combatant `{0}` has been eliminated")]
    Eliminated(CombatantId),
    #[error(transparent)]
    InvalidSpeed(#[from] SpeedError),
}

/// Drives a battle turn by turn
pub struct TurnScheduler {
    session: BattleSession,
    combatants: Vec<Combatant>,
    /// Indices into `combatants` in acting order
    order: Vec<usize>,
    /// Position in `order` of the next combatant to act
    cursor: usize,
    state: watch::Sender<TurnState>,
    turn: u32,
    result: Option<BattleResult>,
}

impl TurnScheduler {
    /// Set up a battle; unknown minigame ids and duplicate ids fail here
    pub fn new(session: BattleSession, combatants: Vec<Combatant>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for combatant in &combatants {
            if !seen.insert(combatant.id().clone()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate combatant id `{}`",
                    combatant.id()
                )));
            }
        }

        session
            .registry()
            .ensure_registered(combatants.iter().filter_map(|c| c.action.minigame.as_deref()))?;

        let (state, _) = watch::channel(TurnState::Idle);
        let order = (0..combatants.len()).collect();

        info!(combatants = combatants.len(), "battle ready");

        Ok(TurnScheduler {
            session,
            combatants,
            order,
            cursor: 0,
            state,
            turn: 0,
            result: None,
        })
    }

    /// Build the roster from a config
    pub fn from_config(config: &BattleConfig, session: BattleSession) -> Result<Self, ConfigError> {
        Self::new(session, config.to_combatants())
    }

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BattleSession {
        &mut self.session
    }

    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id() == id)
    }

    /// Current acting order (may still contain combatants killed this turn)
    pub fn turn_order(&self) -> Vec<&CombatantId> {
        self.order.iter().map(|&i| self.combatants[i].id()).collect()
    }

    /// Combatant that acts on the next turn
    pub fn next_actor(&self) -> Option<&CombatantId> {
        self.order.get(self.cursor).map(|&i| self.combatants[i].id())
    }

    pub fn state(&self) -> TurnState {
        *self.state.borrow()
    }

    /// Follow state transitions from another task
    pub fn subscribe_state(&self) -> watch::Receiver<TurnState> {
        self.state.subscribe()
    }

    /// Turns started so far
    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.result
    }

    pub fn set_speed(&self, speed: f64) -> Result<(), SchedulerError> {
        self.session.speed().set(speed)?;
        debug!(speed, "battle speed changed");
        Ok(())
    }

    /// Apply another character from a combatant's roster
    ///
    /// Identity is kept; health resets to the new character's maximum.
    pub fn switch_character(&mut self, id: &CombatantId, index: usize) -> Result<(), SchedulerError> {
        let combatant = self
            .combatants
            .iter_mut()
            .find(|c| c.id() == id)
            .ok_or_else(|| SchedulerError::UnknownCombatant(id.clone()))?;

        if combatant.is_dead() {
            return Err(SchedulerError::Eliminated(id.clone()));
        }
        if combatant.switch_character(index).is_none() {
            return Err(SchedulerError::NoSuchCharacter {
                id: id.clone(),
                index,
            });
        }

        let character = combatant
            .stats()
            .map(|s| s.name.clone())
            .unwrap_or_default();
        info!(combatant = %id, character = %character, version = combatant.stats_version(), "character switched");
        self.session.emit(BattleEvent::CharacterSwitched {
            combatant: id.clone(),
            character,
        });
        Ok(())
    }

    /// Current health, stats version and active character of every combatant
    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            combatants: self
                .combatants
                .iter()
                .map(|c| CombatantSnapshot {
                    combatant_id: c.id().clone(),
                    current_health: c.health().map(|h| h.current()).unwrap_or(0),
                    stats_version: c.stats_version(),
                    active_character: c.active_character(),
                })
                .collect(),
        }
    }

    /// Load saved characters and health before the first turn
    ///
    /// Entries that name a character re-apply it and take the saved stats
    /// version. Entries without one must match the live stats version.
    /// Every entry is checked before anything is applied, so a rejected
    /// snapshot leaves the battle untouched. Combatants restored at zero
    /// health are reported dead here and leave the turn order on the
    /// first turn.
    pub fn restore(&mut self, snapshot: &BattleSnapshot) -> Result<(), SnapshotError> {
        if self.turn > 0 || self.state() != TurnState::Idle {
            return Err(SnapshotError::BattleStarted);
        }

        let mut targets = Vec::with_capacity(snapshot.combatants.len());
        for entry in &snapshot.combatants {
            let index = self
                .combatants
                .iter()
                .position(|c| c.id() == &entry.combatant_id)
                .ok_or_else(|| SnapshotError::UnknownCombatant(entry.combatant_id.clone()))?;
            let combatant = &self.combatants[index];

            match entry.active_character {
                Some(character) if character >= combatant.characters().len() => {
                    return Err(SnapshotError::NoSuchCharacter {
                        id: entry.combatant_id.clone(),
                        index: character,
                    });
                }
                Some(_) => {}
                None => {
                    let live = combatant.stats_version();
                    if live != entry.stats_version {
                        return Err(SnapshotError::StatsVersionMismatch {
                            id: entry.combatant_id.clone(),
                            saved: entry.stats_version,
                            live,
                        });
                    }
                }
            }
            targets.push((index, entry));
        }

        for (index, entry) in targets {
            let combatant = &mut self.combatants[index];
            if let Some(character) = entry.active_character {
                combatant.restore_character(character, entry.stats_version);
            }
            combatant.restore_health(entry.current_health);

            if combatant.is_dead() {
                let id = combatant.id().clone();
                info!(combatant = %id, "restored as defeated");
                self.session.emit(BattleEvent::Death { combatant: id });
            }
        }
        info!(combatants = snapshot.combatants.len(), "snapshot restored");
        Ok(())
    }

    pub fn save_to(&self, store: &mut dyn SnapshotStore) -> Result<(), SnapshotError> {
        store.save(&self.snapshot())
    }

    /// Restore from a store; `false` when it held nothing
    pub fn load_from(&mut self, store: &dyn SnapshotStore) -> Result<bool, SnapshotError> {
        match store.load()? {
            Some(snapshot) => {
                self.restore(&snapshot)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn set_state(&self, next: TurnState) {
        let current = self.state();
        debug_assert!(
            current.can_transition_to(next),
            "illegal turn transition {:?} -> {:?}",
            current,
            next
        );
        self.state.send_replace(next);
    }
}
