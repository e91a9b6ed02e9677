//! MinigameRegistry - Explicit id -> factory mapping

use super::{AutoCheck, ButtonMash, Minigame, TimingBar};
use crate::config::ConfigError;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Builds a fresh minigame instance from a per-run seed, or says why it cannot
pub type MinigameFactory = Box<dyn Fn(u64) -> Result<Box<dyn Minigame>, String> + Send + Sync>;

/// Minigame factories by id, resolved at battle setup
#[derive(Default)]
pub struct MinigameRegistry {
    factories: HashMap<String, MinigameFactory>,
}

impl fmt::Debug for MinigameRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MinigameRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl MinigameRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        MinigameRegistry {
            factories: HashMap::new(),
        }
    }

    /// Register a factory, replacing any previous one with the same id
    pub fn register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(u64) -> Box<dyn Minigame> + Send + Sync + 'static,
    {
        self.factories
            .insert(id.to_string(), Box::new(move |seed| Ok::<_, String>(factory(seed))));
    }

    /// Register a factory that may fail per run (assets, devices)
    pub fn try_register<F>(&mut self, id: &str, factory: F)
    where
        F: Fn(u64) -> Result<Box<dyn Minigame>, String> + Send + Sync + 'static,
    {
        self.factories.insert(id.to_string(), Box::new(factory));
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    /// Instantiate a minigame by id
    pub fn create(&self, id: &str, seed: u64) -> Result<Box<dyn Minigame>, ConfigError> {
        let factory = self
            .factories
            .get(id)
            .ok_or_else(|| ConfigError::UnknownMinigame(id.to_string()))?;
        factory(seed).map_err(|reason| ConfigError::MinigameUnavailable {
            id: id.to_string(),
            reason,
        })
    }

    /// Fail fast on the first unregistered id
    pub fn ensure_registered<'a>(&self, ids: impl IntoIterator<Item = &'a str>) -> Result<(), ConfigError> {
        for id in ids {
            if !self.contains(id) {
                return Err(ConfigError::UnknownMinigame(id.to_string()));
            }
        }
        Ok(())
    }

    /// Registry with the built-in variants
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register("timing_bar", |_| Box::new(TimingBar::default()));

        // 4 presses for a hit, 9 for a perfect
        registry.register("button_mash", |_| Box::new(ButtonMash::new(4, 9)));

        // Mostly successful enemies with the occasional whiff or crit window
        registry.register("auto", |seed| {
            Box::new(AutoCheck::new([2, 6, 2], Duration::from_millis(400), seed))
        });

        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minigame::ScriptedMinigame;
    use crate::types::ActionOutcome;

    #[test]
    fn test_defaults_registered() {
        let registry = MinigameRegistry::with_defaults();
        assert_eq!(registry.ids(), vec!["auto", "button_mash", "timing_bar"]);
        let game = registry.create("timing_bar", 0).unwrap();
        assert_eq!(game.id(), "timing_bar");
    }

    #[test]
    fn test_unknown_id_fails() {
        let registry = MinigameRegistry::with_defaults();
        let err = registry.create("dance_off", 0).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownMinigame(ref id) if id == "dance_off"));
    }

    #[test]
    fn test_failing_factory() {
        let mut registry = MinigameRegistry::new();
        registry.try_register("rhythm", |_| Err("no audio device".to_string()));
        assert!(registry.contains("rhythm"));
        let err = registry.create("rhythm", 0).err().unwrap();
        assert!(matches!(
            err,
            ConfigError::MinigameUnavailable { ref id, ref reason } if id == "rhythm" && reason == "no audio device"
        ));
    }

    #[test]
    fn test_ensure_registered() {
        let registry = MinigameRegistry::with_defaults();
        assert!(registry.ensure_registered(["auto", "timing_bar"]).is_ok());
        assert!(registry.ensure_registered(["auto", "rhythm"]).is_err());
    }

    #[test]
    fn test_custom_registration_overrides() {
        let mut registry = MinigameRegistry::with_defaults();
        registry.register("auto", |_| {
            Box::new(ScriptedMinigame::new(ActionOutcome::Perfect, Duration::ZERO))
        });
        assert_eq!(registry.create("auto", 3).unwrap().id(), "scripted");
    }
}
