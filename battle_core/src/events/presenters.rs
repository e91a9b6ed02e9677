//! Built-in observers

use super::{BattleEvent, Presentation};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Mirrors events into the log
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl Presentation for TracingPresenter {
    fn on_event(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::TurnStarted { combatant, turn } => {
                info!(combatant = %combatant, turn, "turn started");
            }
            BattleEvent::ActionSkipped { combatant, reason } => {
                warn!(combatant = %combatant, reason = ?reason, "action skipped");
            }
            BattleEvent::MinigameStarted {
                combatant,
                minigame,
                deadline_secs,
            } => {
                debug!(combatant = %combatant, minigame = %minigame, deadline_secs, "minigame started");
            }
            BattleEvent::MinigameFinished {
                combatant,
                minigame,
                outcome,
                timed_out,
            } => {
                info!(combatant = %combatant, minigame = %minigame, outcome = %outcome, timed_out, "minigame finished");
            }
            BattleEvent::DamageApplied {
                attacker,
                target,
                amount,
                outcome,
                critical,
                remaining,
            } => {
                info!(
                    attacker = %attacker,
                    target = %target,
                    amount,
                    outcome = %outcome,
                    critical,
                    remaining,
                    "damage applied"
                );
            }
            BattleEvent::Healed { combatant, amount } => {
                debug!(combatant = %combatant, amount, "healed");
            }
            BattleEvent::CharacterSwitched {
                combatant,
                character,
            } => {
                info!(combatant = %combatant, character = %character, "character switched");
            }
            BattleEvent::Death { combatant } => {
                info!(combatant = %combatant, "combatant died");
            }
            BattleEvent::PausedChanged { paused } => {
                debug!(paused, "pause changed");
            }
            BattleEvent::BattleEnded { result } => {
                info!(result = ?result, "battle ended");
            }
        }
    }
}

/// Forwards every event into a channel (UI threads, tests)
#[derive(Debug, Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<BattleEvent>,
}

impl ChannelPresenter {
    pub fn new(tx: mpsc::UnboundedSender<BattleEvent>) -> Self {
        ChannelPresenter { tx }
    }

    /// Create a presenter and the receiving end
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BattleEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelPresenter { tx }, rx)
    }
}

impl Presentation for ChannelPresenter {
    fn on_event(&mut self, event: &BattleEvent) {
        // A closed receiver just means nobody is watching anymore
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CombatantId;

    #[test]
    fn test_channel_presenter_forwards() {
        let (mut presenter, mut rx) = ChannelPresenter::channel();
        presenter.on_event(&BattleEvent::Healed {
            combatant: CombatantId::from("hero"),
            amount: 3,
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            BattleEvent::Healed {
                combatant: CombatantId::from("hero"),
                amount: 3,
            }
        );
    }

    #[test]
    fn test_channel_presenter_survives_closed_receiver() {
        let (mut presenter, rx) = ChannelPresenter::channel();
        drop(rx);
        presenter.on_event(&BattleEvent::PausedChanged { paused: false });
    }
}
