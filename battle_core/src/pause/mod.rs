//! PauseCoordinator - Reference-counted suspension gate
//!
//! Independent systems (minigame presentation, hitstop, cutscenes) request
//! suspension in overlapping windows. The gate is paused while any source
//! holds a count; each `acquire` needs its own `release`.

mod guard;

pub use guard::PauseGuard;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error};

/// Identifier of a system requesting suspension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseSource {
    Minigame,
    Hitstop,
    Cutscene,
    Other(String),
}

impl fmt::Display for PauseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PauseSource::Minigame => f.write_str("minigame"),
            PauseSource::Hitstop => f.write_str("hitstop"),
            PauseSource::Cutscene => f.write_str("cutscene"),
            PauseSource::Other(name) => f.write_str(name),
        }
    }
}

/// Pause gate errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PauseError {
    #[error("release of pause source `{0}` without a matching acquire")]
    NotHeld(PauseSource),
}

/// Snapshot of the outstanding counts
#[derive(Debug, Clone, Default)]
pub struct PauseState {
    counts: HashMap<PauseSource, u32>,
    total: u32,
}

impl PauseState {
    pub fn is_paused(&self) -> bool {
        self.total > 0
    }

    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn count(&self, source: &PauseSource) -> u32 {
        self.counts.get(source).copied().unwrap_or(0)
    }

    /// Sources currently holding the gate
    pub fn active_sources(&self) -> Vec<PauseSource> {
        self.counts.keys().cloned().collect()
    }
}

/// Scheduler-wide gate, cheap to clone and share with minigame tasks
#[derive(Debug, Clone)]
pub struct PauseCoordinator {
    state: Arc<watch::Sender<PauseState>>,
}

impl Default for PauseCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl PauseCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PauseState::default());
        PauseCoordinator {
            state: Arc::new(tx),
        }
    }

    /// Increment the count for `source`
    pub fn acquire(&self, source: PauseSource) {
        self.state.send_if_modified(|state| {
            let was_paused = state.is_paused();
            *state.counts.entry(source.clone()).or_insert(0) += 1;
            state.total += 1;
            debug!(source = %source, total = state.total, "pause acquired");
            // Watchers only care about the paused flag flipping
            was_paused != state.is_paused()
        });
    }

    /// Decrement the count for `source`
    ///
    /// Releasing a source with no outstanding acquire is a programming
    /// error: it is logged and returned, and the count is left untouched.
    pub fn release(&self, source: &PauseSource) -> Result<(), PauseError> {
        let mut result = Ok(());
        self.state.send_if_modified(|state| {
            let Some(count) = state.counts.get_mut(source) else {
                result = Err(PauseError::NotHeld(source.clone()));
                return false;
            };

            *count -= 1;
            if *count == 0 {
                state.counts.remove(source);
            }
            state.total -= 1;
            debug!(source = %source, total = state.total, "pause released");
            !state.is_paused()
        });

        if let Err(ref e) = result {
            error!(error = %e, "unbalanced pause release");
        }
        result
    }

    /// Acquire and get a guard that releases on drop
    pub fn guard(&self, source: PauseSource) -> PauseGuard {
        self.acquire(source.clone());
        PauseGuard::new(self.clone(), source)
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().is_paused()
    }

    pub fn total(&self) -> u32 {
        self.state.borrow().total()
    }

    pub fn count(&self, source: &PauseSource) -> u32 {
        self.state.borrow().count(source)
    }

    pub fn snapshot(&self) -> PauseState {
        self.state.borrow().clone()
    }

    /// Receiver notified whenever the paused flag flips
    pub fn subscribe(&self) -> watch::Receiver<PauseState> {
        self.state.subscribe()
    }

    /// Wait (without spinning) until no source holds the gate
    pub async fn wait_until_clear(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(|state| !state.is_paused()).await;
    }
}
