//! Minigames - Skill checks that gate an action's effectiveness
//!
//! A minigame is a single-method capability: run until the player submits
//! and return an [`ActionOutcome`]. The [`MinigameRunner`] enforces the
//! deadline and falls back to [`Minigame::auto_submit`] on timeout.

mod registry;
mod runner;
mod variants;

pub use registry::{MinigameFactory, MinigameRegistry};
pub use runner::{MinigameReport, MinigameRunner};
pub use variants::{AutoCheck, ButtonMash, ScriptedMinigame, TimingBar};

use crate::pause::PauseCoordinator;
use crate::types::{ActionOutcome, CombatantId};
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::Instant;

/// Player input routed to the running minigame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinigameInput {
    Confirm,
    Key(char),
}

/// Broadcast hub for minigame input (keyboard thread, tests, replays)
#[derive(Debug, Clone)]
pub struct InputHub {
    tx: broadcast::Sender<MinigameInput>,
}

impl Default for InputHub {
    fn default() -> Self {
        Self::new(64)
    }
}

impl InputHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        InputHub { tx }
    }

    /// Send input to whichever minigame is listening; dropped if none is
    pub fn send(&self, input: MinigameInput) {
        let _ = self.tx.send(input);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MinigameInput> {
        self.tx.subscribe()
    }
}

/// Everything a running minigame may touch
#[derive(Debug)]
pub struct MinigameContext {
    pub combatant: CombatantId,
    /// Minigames may stack their own acquires (intro animation, result display)
    pub pause: PauseCoordinator,
    inputs: broadcast::Receiver<MinigameInput>,
    started_at: Instant,
    deadline: Duration,
}

impl MinigameContext {
    pub fn new(
        combatant: CombatantId,
        pause: PauseCoordinator,
        inputs: broadcast::Receiver<MinigameInput>,
        deadline: Duration,
    ) -> Self {
        MinigameContext {
            combatant,
            pause,
            inputs,
            started_at: Instant::now(),
            deadline,
        }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn remaining(&self) -> Duration {
        self.deadline.saturating_sub(self.elapsed())
    }

    /// Wait for the next input; `None` once the hub is gone
    pub async fn next_input(&mut self) -> Option<MinigameInput> {
        loop {
            match self.inputs.recv().await {
                Ok(input) => return Some(input),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Discard input queued so far (presses made during an intro)
    pub fn drain_inputs(&mut self) -> usize {
        let mut drained = 0;
        loop {
            match self.inputs.try_recv() {
                Ok(_) => drained += 1,
                Err(broadcast::error::TryRecvError::Lagged(n)) => drained += n as usize,
                Err(_) => return drained,
            }
        }
    }
}

/// Skill check capability
#[async_trait]
pub trait Minigame: Send {
    /// Registry id of this variant
    fn id(&self) -> &str;

    /// Play until the player submits
    async fn run(&mut self, ctx: &mut MinigameContext) -> ActionOutcome;

    /// Force a result from whatever partial state exists at the deadline
    fn auto_submit(&self) -> ActionOutcome {
        ActionOutcome::Fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_context_receives_hub_input() {
        let hub = InputHub::default();
        let mut ctx = MinigameContext::new(
            "hero".into(),
            PauseCoordinator::new(),
            hub.subscribe(),
            Duration::from_secs(1),
        );
        hub.send(MinigameInput::Key('a'));
        assert_eq!(ctx.next_input().await, Some(MinigameInput::Key('a')));
    }

    #[tokio::test]
    async fn test_drain_inputs() {
        let hub = InputHub::default();
        let mut ctx = MinigameContext::new(
            "hero".into(),
            PauseCoordinator::new(),
            hub.subscribe(),
            Duration::from_secs(1),
        );
        hub.send(MinigameInput::Confirm);
        hub.send(MinigameInput::Confirm);
        assert_eq!(ctx.drain_inputs(), 2);
        assert_eq!(ctx.drain_inputs(), 0);
    }

    #[tokio::test]
    async fn test_next_input_none_when_hub_dropped() {
        let hub = InputHub::default();
        let mut ctx = MinigameContext::new(
            "hero".into(),
            PauseCoordinator::new(),
            hub.subscribe(),
            Duration::from_secs(1),
        );
        drop(hub);
        assert_eq!(ctx.next_input().await, None);
    }
}
