//! PauseGuard - Scoped acquire/release

use super::{PauseCoordinator, PauseSource};

/// Holds one count on the gate until dropped or released
#[derive(Debug)]
#[must_use = "the pause is released as soon as the guard is dropped"]
pub struct PauseGuard {
    gate: PauseCoordinator,
    source: PauseSource,
    held: bool,
}

impl PauseGuard {
    pub(super) fn new(gate: PauseCoordinator, source: PauseSource) -> Self {
        PauseGuard {
            gate,
            source,
            held: true,
        }
    }

    pub fn source(&self) -> &PauseSource {
        &self.source
    }

    /// Release now instead of at drop
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.held {
            self.held = false;
            // A guard always owns exactly one count
            let _ = self.gate.release(&self.source);
        }
    }
}

impl Drop for PauseGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}
