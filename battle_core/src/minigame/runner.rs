//! MinigameRunner - Deadline enforcement with auto-submit

use super::{Minigame, MinigameContext};
use crate::types::ActionOutcome;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, warn};

/// Result of one skill check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinigameReport {
    pub outcome: ActionOutcome,
    /// True when the deadline forced an auto-submit
    pub timed_out: bool,
    pub elapsed: Duration,
}

/// Runs a minigame to completion within its context deadline
pub struct MinigameRunner;

impl MinigameRunner {
    /// Run `game` and always return by the deadline
    ///
    /// On timeout the game's future is dropped (releasing any pause it
    /// held) and the outcome comes from [`Minigame::auto_submit`]. A
    /// timeout is a normal gameplay path, not an error.
    pub async fn run(game: &mut dyn Minigame, mut ctx: MinigameContext) -> MinigameReport {
        let started = Instant::now();
        let deadline = ctx.deadline();

        let finished = timeout(deadline, game.run(&mut ctx)).await;
        let elapsed = started.elapsed();

        match finished {
            Ok(outcome) => {
                debug!(minigame = game.id(), combatant = %ctx.combatant, outcome = %outcome, "minigame submitted");
                MinigameReport {
                    outcome,
                    timed_out: false,
                    elapsed,
                }
            }
            Err(_) => {
                let outcome = game.auto_submit();
                warn!(
                    minigame = game.id(),
                    combatant = %ctx.combatant,
                    outcome = %outcome,
                    deadline_ms = deadline.as_millis() as u64,
                    "minigame timed out, auto-submitting"
                );
                MinigameReport {
                    outcome,
                    timed_out: true,
                    elapsed,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::{ButtonMash, InputHub, MinigameInput, ScriptedMinigame};
    use crate::pause::{PauseCoordinator, PauseSource};
    use async_trait::async_trait;

    fn context(hub: &InputHub, pause: &PauseCoordinator, deadline_ms: u64) -> MinigameContext {
        MinigameContext::new(
            "hero".into(),
            pause.clone(),
            hub.subscribe(),
            Duration::from_millis(deadline_ms),
        )
    }

    /// Never submits and holds a pause while running
    struct Stubborn;

    #[async_trait]
    impl Minigame for Stubborn {
        fn id(&self) -> &str {
            "stubborn"
        }

        async fn run(&mut self, ctx: &mut MinigameContext) -> ActionOutcome {
            let _intro = ctx.pause.guard(PauseSource::Cutscene);
            std::future::pending::<()>().await;
            ActionOutcome::Perfect
        }

        fn auto_submit(&self) -> ActionOutcome {
            ActionOutcome::Success
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_submission_before_deadline() {
        let hub = InputHub::default();
        let pause = PauseCoordinator::new();
        let mut game = ScriptedMinigame::new(ActionOutcome::Perfect, Duration::from_millis(300));

        let report = MinigameRunner::run(&mut game, context(&hub, &pause, 1_000)).await;
        assert_eq!(report.outcome, ActionOutcome::Perfect);
        assert!(!report.timed_out);
        assert!(report.elapsed >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_auto_submits_and_releases_pause() {
        let hub = InputHub::default();
        let pause = PauseCoordinator::new();
        let mut game = Stubborn;

        let report = MinigameRunner::run(&mut game, context(&hub, &pause, 2_000)).await;
        assert!(report.timed_out);
        assert_eq!(report.outcome, ActionOutcome::Success);
        assert!(report.elapsed >= Duration::from_millis(2_000));
        assert!(report.elapsed <= Duration::from_millis(2_001));
        assert!(!pause.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_within_deadline_without_interaction() {
        let hub = InputHub::default();
        let pause = PauseCoordinator::new();
        for deadline_ms in [1u64, 250, 5_000] {
            let mut game = ButtonMash::new(3, 6);
            let report = MinigameRunner::run(&mut game, context(&hub, &pause, deadline_ms)).await;
            assert!(report.timed_out);
            assert_eq!(report.outcome, ActionOutcome::Fail);
            assert!(report.elapsed <= Duration::from_millis(deadline_ms + 1));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_partial_state() {
        let hub = InputHub::default();
        let pause = PauseCoordinator::new();
        let mut game = ButtonMash::new(3, 6);
        let ctx = context(&hub, &pause, 500);
        for _ in 0..4 {
            hub.send(MinigameInput::Confirm);
        }

        let report = MinigameRunner::run(&mut game, ctx).await;
        assert!(report.timed_out);
        assert_eq!(report.outcome, ActionOutcome::Success);
    }
}
