//! Battle time - speed knob, scaled waits and real-time hitstop
//!
//! Scaled waits (turn delays, regen) run at `BattleSpeed` and freeze while
//! the pause gate is held. Hitstop and minigame timers use real time.

use crate::pause::{PauseCoordinator, PauseSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};

/// Speed errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeedError {
    #[error("battle speed must be finite and > 0 (got {0})")]
    Invalid(f64),
}

/// Shared `BattleSpeed` knob, read by the scheduler every tick
#[derive(Debug, Clone)]
pub struct SpeedControl {
    bits: Arc<AtomicU64>,
}

impl Default for SpeedControl {
    fn default() -> Self {
        SpeedControl {
            bits: Arc::new(AtomicU64::new(1.0f64.to_bits())),
        }
    }
}

impl SpeedControl {
    pub fn new(speed: f64) -> Result<Self, SpeedError> {
        let control = Self::default();
        control.set(speed)?;
        Ok(control)
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn set(&self, speed: f64) -> Result<(), SpeedError> {
        if !(speed.is_finite() && speed > 0.0) {
            return Err(SpeedError::Invalid(speed));
        }
        self.bits.store(speed.to_bits(), Ordering::Relaxed);
        Ok(())
    }
}

/// Progress reported by [`BattleClock::wait_scaled`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WaitStep {
    /// Game seconds that elapsed in one step
    Advanced(f64),
    /// The gate closed; the wait is frozen
    Suspended,
    /// The gate cleared; the wait continues
    Resumed,
}

/// Time source for the scheduler
#[derive(Debug, Clone)]
pub struct BattleClock {
    speed: SpeedControl,
    pause: PauseCoordinator,
    /// Real-time poll granularity for scaled waits
    tick: Duration,
}

impl BattleClock {
    pub fn new(speed: SpeedControl, pause: PauseCoordinator, tick: Duration) -> Self {
        BattleClock {
            speed,
            pause,
            tick: tick.max(Duration::from_millis(1)),
        }
    }

    pub fn speed(&self) -> &SpeedControl {
        &self.speed
    }

    pub fn pause(&self) -> &PauseCoordinator {
        &self.pause
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Wait `game_time` of scaled battle time
    ///
    /// Speed is re-read every tick. While paused the wait makes no
    /// progress and blocks on the gate instead of spinning; `on_step`
    /// hears when that starts and ends.
    pub async fn wait_scaled<F>(&self, game_time: Duration, mut on_step: F)
    where
        F: FnMut(WaitStep),
    {
        let mut remaining = game_time.as_secs_f64();
        while remaining > 1e-9 {
            if self.pause.is_paused() {
                on_step(WaitStep::Suspended);
                self.pause.wait_until_clear().await;
                on_step(WaitStep::Resumed);
                continue;
            }

            let speed = self.speed.get();
            let real_step = (remaining / speed).min(self.tick.as_secs_f64());
            sleep(Duration::from_secs_f64(real_step)).await;

            let advanced = (real_step * speed).min(remaining);
            remaining -= advanced;
            on_step(WaitStep::Advanced(advanced));
        }
    }

    /// Hold the `Hitstop` source for `duration` of real time
    ///
    /// Runs as its own task; the returned handle completes once released.
    pub fn hitstop(&self, duration: Duration) -> tokio::task::JoinHandle<()> {
        let guard = self.pause.guard(PauseSource::Hitstop);
        tokio::spawn(async move {
            sleep(duration).await;
            drop(guard);
        })
    }

    /// Real-time instant, unaffected by battle speed
    pub fn now(&self) -> Instant {
        Instant::now()
    }
}
