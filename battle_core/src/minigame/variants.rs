//! Built-in minigame variants

use super::{Minigame, MinigameContext, MinigameInput};
use crate::pause::PauseSource;
use crate::types::ActionOutcome;
use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use tokio::time::{sleep, Instant};

// =============================================================================
// Timing bar
// =============================================================================

/// Press Confirm while the sweeping marker is near the centre
///
/// The marker runs 0 -> 1 -> 0 once per `period`. Grading uses the
/// distance from 0.5.
#[derive(Debug, Clone)]
pub struct TimingBar {
    pub period: Duration,
    /// Max distance from centre for Perfect
    pub perfect_window: f64,
    /// Max distance from centre for Success
    pub success_window: f64,
    /// Intro animation, played under a stacked minigame pause
    pub intro: Duration,
    sweep_started: Option<Instant>,
}

impl Default for TimingBar {
    fn default() -> Self {
        TimingBar {
            period: Duration::from_millis(1_600),
            perfect_window: 0.05,
            success_window: 0.2,
            intro: Duration::from_millis(300),
            sweep_started: None,
        }
    }
}

impl TimingBar {
    pub fn new(period: Duration, perfect_window: f64, success_window: f64) -> Self {
        TimingBar {
            period,
            perfect_window,
            success_window,
            ..Default::default()
        }
    }

    pub fn with_intro(mut self, intro: Duration) -> Self {
        self.intro = intro;
        self
    }

    /// Marker position in [0, 1] after `elapsed` of sweeping
    pub fn position_at(period: Duration, elapsed: Duration) -> f64 {
        let period = period.as_secs_f64();
        if period <= 0.0 {
            return 0.5;
        }
        let phase = (elapsed.as_secs_f64() / period).fract() * 2.0;
        if phase <= 1.0 {
            phase
        } else {
            2.0 - phase
        }
    }

    /// Grade a marker position
    pub fn grade(&self, position: f64) -> ActionOutcome {
        let distance = (position - 0.5).abs();
        if distance <= self.perfect_window {
            ActionOutcome::Perfect
        } else if distance <= self.success_window {
            ActionOutcome::Success
        } else {
            ActionOutcome::Fail
        }
    }

    fn current_position(&self) -> Option<f64> {
        self.sweep_started
            .map(|started| Self::position_at(self.period, started.elapsed()))
    }
}

#[async_trait]
impl Minigame for TimingBar {
    fn id(&self) -> &str {
        "timing_bar"
    }

    async fn run(&mut self, ctx: &mut MinigameContext) -> ActionOutcome {
        if !self.intro.is_zero() {
            let _intro = ctx.pause.guard(PauseSource::Minigame);
            sleep(self.intro).await;
        }
        ctx.drain_inputs();
        self.sweep_started = Some(Instant::now());

        loop {
            match ctx.next_input().await {
                Some(MinigameInput::Confirm) => {
                    let position = self.current_position().unwrap_or(0.0);
                    return self.grade(position);
                }
                Some(_) => continue,
                None => std::future::pending::<()>().await,
            }
        }
    }

    fn auto_submit(&self) -> ActionOutcome {
        // Still in the intro: nothing to grade
        match self.current_position() {
            Some(position) => self.grade(position),
            None => ActionOutcome::Fail,
        }
    }
}

// =============================================================================
// Button mash
// =============================================================================

/// Press Confirm as many times as possible before the deadline
#[derive(Debug, Clone)]
pub struct ButtonMash {
    pub success_target: u32,
    /// Reaching this resolves immediately as Perfect
    pub perfect_target: u32,
    presses: u32,
}

impl ButtonMash {
    pub fn new(success_target: u32, perfect_target: u32) -> Self {
        ButtonMash {
            success_target,
            perfect_target: perfect_target.max(success_target),
            presses: 0,
        }
    }

    pub fn presses(&self) -> u32 {
        self.presses
    }

    fn grade(&self) -> ActionOutcome {
        if self.presses >= self.perfect_target {
            ActionOutcome::Perfect
        } else if self.presses >= self.success_target {
            ActionOutcome::Success
        } else {
            ActionOutcome::Fail
        }
    }
}

#[async_trait]
impl Minigame for ButtonMash {
    fn id(&self) -> &str {
        "button_mash"
    }

    async fn run(&mut self, ctx: &mut MinigameContext) -> ActionOutcome {
        loop {
            match ctx.next_input().await {
                Some(MinigameInput::Confirm) => {
                    self.presses += 1;
                    if self.presses >= self.perfect_target {
                        return ActionOutcome::Perfect;
                    }
                }
                Some(_) => continue,
                None => std::future::pending::<()>().await,
            }
        }
    }

    fn auto_submit(&self) -> ActionOutcome {
        self.grade()
    }
}

// =============================================================================
// AI check
// =============================================================================

/// Skill check for AI combatants: weighted roll after a think delay
#[derive(Debug, Clone)]
pub struct AutoCheck {
    /// Relative weights for Fail, Success, Perfect
    pub weights: [u32; 3],
    pub think: Duration,
    rng: ChaCha8Rng,
}

impl AutoCheck {
    pub fn new(weights: [u32; 3], think: Duration, seed: u64) -> Self {
        AutoCheck {
            weights,
            think,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Pick an outcome from the weights
    pub fn roll(&mut self) -> ActionOutcome {
        let total: u32 = self.weights.iter().sum();
        if total == 0 {
            return ActionOutcome::Success;
        }
        let pick = self.rng.gen_range(0..total);
        if pick < self.weights[0] {
            ActionOutcome::Fail
        } else if pick < self.weights[0] + self.weights[1] {
            ActionOutcome::Success
        } else {
            ActionOutcome::Perfect
        }
    }
}

#[async_trait]
impl Minigame for AutoCheck {
    fn id(&self) -> &str {
        "auto"
    }

    async fn run(&mut self, _ctx: &mut MinigameContext) -> ActionOutcome {
        sleep(self.think).await;
        self.roll()
    }
}

// =============================================================================
// Scripted
// =============================================================================

/// Fixed outcome after a fixed delay (tests, cutscene battles)
#[derive(Debug, Clone)]
pub struct ScriptedMinigame {
    pub outcome: ActionOutcome,
    pub delay: Duration,
}

impl ScriptedMinigame {
    pub fn new(outcome: ActionOutcome, delay: Duration) -> Self {
        ScriptedMinigame { outcome, delay }
    }
}

#[async_trait]
impl Minigame for ScriptedMinigame {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn run(&mut self, _ctx: &mut MinigameContext) -> ActionOutcome {
        sleep(self.delay).await;
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::{InputHub, MinigameRunner};
    use crate::pause::PauseCoordinator;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_timing_bar_sweep() {
        let period = ms(1_000);
        assert!((TimingBar::position_at(period, ms(0)) - 0.0).abs() < 1e-9);
        assert!((TimingBar::position_at(period, ms(250)) - 0.5).abs() < 1e-9);
        assert!((TimingBar::position_at(period, ms(500)) - 1.0).abs() < 1e-9);
        assert!((TimingBar::position_at(period, ms(750)) - 0.5).abs() < 1e-9);
        assert!((TimingBar::position_at(period, ms(1_250)) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_timing_bar_grade() {
        let bar = TimingBar::new(ms(1_000), 0.05, 0.2);
        assert_eq!(bar.grade(0.52), ActionOutcome::Perfect);
        assert_eq!(bar.grade(0.35), ActionOutcome::Success);
        assert_eq!(bar.grade(0.9), ActionOutcome::Fail);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timing_bar_press_at_centre() {
        let hub = InputHub::default();
        let pause = PauseCoordinator::new();
        let mut bar = TimingBar::new(ms(1_000), 0.05, 0.2).with_intro(ms(200));
        let ctx = MinigameContext::new("hero".into(), pause.clone(), hub.subscribe(), ms(3_000));

        let presser = hub.clone();
        let gate = pause.clone();
        tokio::spawn(async move {
            // pressed during the intro: discarded
            sleep(ms(100)).await;
            assert!(gate.is_paused());
            presser.send(MinigameInput::Confirm);
            // 200ms intro + 250ms sweep = centre
            sleep(ms(350)).await;
            presser.send(MinigameInput::Confirm);
        });

        let report = MinigameRunner::run(&mut bar, ctx).await;
        assert!(!report.timed_out);
        assert_eq!(report.outcome, ActionOutcome::Perfect);
        assert!(!pause.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timing_bar_timeout_grades_marker() {
        let hub = InputHub::default();
        let pause = PauseCoordinator::new();
        // no intro, deadline lands exactly on the centre
        let mut bar = TimingBar::new(ms(1_000), 0.05, 0.2).with_intro(Duration::ZERO);
        let ctx = MinigameContext::new("hero".into(), pause, hub.subscribe(), ms(1_250));

        let report = MinigameRunner::run(&mut bar, ctx).await;
        assert!(report.timed_out);
        assert_eq!(report.outcome, ActionOutcome::Perfect);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timing_bar_timeout_during_intro_fails() {
        let hub = InputHub::default();
        let pause = PauseCoordinator::new();
        let mut bar = TimingBar::default().with_intro(ms(5_000));
        let ctx = MinigameContext::new("hero".into(), pause.clone(), hub.subscribe(), ms(1_000));

        let report = MinigameRunner::run(&mut bar, ctx).await;
        assert!(report.timed_out);
        assert_eq!(report.outcome, ActionOutcome::Fail);
        // intro pause released with the dropped future
        assert!(!pause.is_paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_button_mash_perfect_resolves_early() {
        let hub = InputHub::default();
        let mut mash = ButtonMash::new(2, 3);
        let ctx = MinigameContext::new("hero".into(), PauseCoordinator::new(), hub.subscribe(), ms(10_000));
        for _ in 0..3 {
            hub.send(MinigameInput::Confirm);
        }
        hub.send(MinigameInput::Key('x'));

        let report = MinigameRunner::run(&mut mash, ctx).await;
        assert!(!report.timed_out);
        assert_eq!(report.outcome, ActionOutcome::Perfect);
        assert_eq!(mash.presses(), 3);
    }

    #[test]
    fn test_auto_check_is_seeded() {
        let mut a = AutoCheck::new([1, 2, 1], ms(0), 99);
        let mut b = AutoCheck::new([1, 2, 1], ms(0), 99);
        let rolls_a: Vec<_> = (0..20).map(|_| a.roll()).collect();
        let rolls_b: Vec<_> = (0..20).map(|_| b.roll()).collect();
        assert_eq!(rolls_a, rolls_b);
    }

    #[test]
    fn test_auto_check_single_weight() {
        let mut check = AutoCheck::new([0, 0, 5], ms(0), 1);
        for _ in 0..10 {
            assert_eq!(check.roll(), ActionOutcome::Perfect);
        }
        let mut check = AutoCheck::new([0, 0, 0], ms(0), 1);
        assert_eq!(check.roll(), ActionOutcome::Success);
    }
}
