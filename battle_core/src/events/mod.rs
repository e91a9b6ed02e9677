//! Battle events and read-only presentation observers
//!
//! Camera, animation and UI collaborators implement [`Presentation`].
//! Observers only ever see ids and values, never the live Health, Stats
//! or turn state.

mod presenters;

pub use presenters::{ChannelPresenter, TracingPresenter};

use crate::types::{ActionOutcome, BattleResult, CombatantId};
use serde::{Deserialize, Serialize};

/// Why a turn advanced without resolving damage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// No stats applied (empty roster)
    MissingStats,
    /// No living opponent to target
    NoTarget,
    /// The minigame's factory failed for this run
    MissingMinigame(String),
}

/// Everything the battle loop reports outward
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BattleEvent {
    TurnStarted {
        combatant: CombatantId,
        turn: u32,
    },
    ActionSkipped {
        combatant: CombatantId,
        reason: SkipReason,
    },
    MinigameStarted {
        combatant: CombatantId,
        minigame: String,
        deadline_secs: f64,
    },
    MinigameFinished {
        combatant: CombatantId,
        minigame: String,
        outcome: ActionOutcome,
        timed_out: bool,
    },
    DamageApplied {
        attacker: CombatantId,
        target: CombatantId,
        amount: u32,
        outcome: ActionOutcome,
        critical: bool,
        remaining: u32,
    },
    Healed {
        combatant: CombatantId,
        amount: u32,
    },
    CharacterSwitched {
        combatant: CombatantId,
        character: String,
    },
    Death {
        combatant: CombatantId,
    },
    PausedChanged {
        paused: bool,
    },
    BattleEnded {
        result: BattleResult,
    },
}

/// Read-only observer of battle progress
pub trait Presentation: Send {
    fn on_turn_started(&mut self, _combatant: &CombatantId) {}

    fn on_damage_applied(&mut self, _combatant: &CombatantId, _amount: u32) {}

    fn on_death(&mut self, _combatant: &CombatantId) {}

    fn on_paused_changed(&mut self, _paused: bool) {}

    /// Called for every event, including the ones above
    fn on_event(&mut self, _event: &BattleEvent) {}
}

/// Fans events out to every registered observer
#[derive(Default)]
pub struct EventDispatcher {
    observers: Vec<Box<dyn Presentation>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Box<dyn Presentation>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn emit(&mut self, event: BattleEvent) {
        for observer in &mut self.observers {
            match &event {
                BattleEvent::TurnStarted { combatant, .. } => observer.on_turn_started(combatant),
                BattleEvent::DamageApplied { target, amount, .. } => {
                    observer.on_damage_applied(target, *amount)
                }
                BattleEvent::Death { combatant } => observer.on_death(combatant),
                BattleEvent::PausedChanged { paused } => observer.on_paused_changed(*paused),
                _ => {}
            }
            observer.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    struct Counter {
        tx: mpsc::Sender<&'static str>,
    }

    impl Presentation for Counter {
        fn on_death(&mut self, _combatant: &CombatantId) {
            let _ = self.tx.send("death");
        }

        fn on_event(&mut self, _event: &BattleEvent) {
            let _ = self.tx.send("event");
        }
    }

    #[test]
    fn test_dispatch_calls_specific_and_catch_all() {
        let (tx, rx) = mpsc::channel();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.register(Box::new(Counter { tx }));

        dispatcher.emit(BattleEvent::Death {
            combatant: "slime".into(),
        });
        dispatcher.emit(BattleEvent::PausedChanged { paused: true });

        let seen: Vec<_> = rx.try_iter().collect();
        assert_eq!(seen, vec!["death", "event", "event"]);
    }
}
