//! BattleSession - Per-battle context handed to every component
//!
//! Owns the pause gate, clock, minigame registry, input hub, RNG and
//! observers for one battle. Created by whoever starts the battle and
//! dropped when it ends; nothing here is global.

use crate::clock::{BattleClock, SpeedControl};
use crate::config::{BattleConfig, BattleSettings, ConfigError};
use crate::events::{BattleEvent, EventDispatcher, Presentation};
use crate::minigame::{InputHub, MinigameRegistry};
use crate::outcome::OutcomeResolver;
use crate::pause::PauseCoordinator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Shared services for a single battle
pub struct BattleSession {
    settings: BattleSettings,
    outcomes: OutcomeResolver,
    pause: PauseCoordinator,
    clock: BattleClock,
    registry: MinigameRegistry,
    inputs: InputHub,
    rng: ChaCha8Rng,
    events: EventDispatcher,
}

impl BattleSession {
    pub fn builder() -> BattleSessionBuilder {
        BattleSessionBuilder::new()
    }

    /// Builder preloaded with a config's `[battle]` and `[outcomes]` sections
    pub fn from_config(config: &BattleConfig) -> BattleSessionBuilder {
        BattleSessionBuilder::new()
            .settings(config.battle.clone())
            .outcomes(config.outcomes.clone())
    }

    pub fn settings(&self) -> &BattleSettings {
        &self.settings
    }

    pub fn outcomes(&self) -> &OutcomeResolver {
        &self.outcomes
    }

    pub fn pause(&self) -> &PauseCoordinator {
        &self.pause
    }

    pub fn clock(&self) -> &BattleClock {
        &self.clock
    }

    /// The BattleSpeed knob; clone it to adjust speed from another task
    pub fn speed(&self) -> &SpeedControl {
        self.clock.speed()
    }

    pub fn registry(&self) -> &MinigameRegistry {
        &self.registry
    }

    pub fn inputs(&self) -> &InputHub {
        &self.inputs
    }

    pub fn rng_mut(&mut self) -> &mut ChaCha8Rng {
        &mut self.rng
    }

    pub fn add_observer(&mut self, observer: Box<dyn Presentation>) {
        self.events.register(observer);
    }

    pub fn emit(&mut self, event: BattleEvent) {
        self.events.emit(event);
    }
}

/// Assembles a [`BattleSession`]
pub struct BattleSessionBuilder {
    settings: BattleSettings,
    outcomes: OutcomeResolver,
    registry: Option<MinigameRegistry>,
    inputs: Option<InputHub>,
    events: EventDispatcher,
}

impl Default for BattleSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleSessionBuilder {
    pub fn new() -> Self {
        BattleSessionBuilder {
            settings: BattleSettings::default(),
            outcomes: OutcomeResolver::default(),
            registry: None,
            inputs: None,
            events: EventDispatcher::new(),
        }
    }

    pub fn settings(mut self, settings: BattleSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn outcomes(mut self, outcomes: OutcomeResolver) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Replace the built-in minigame registry
    pub fn registry(mut self, registry: MinigameRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Share an existing input hub (e.g. one the UI already feeds)
    pub fn inputs(mut self, inputs: InputHub) -> Self {
        self.inputs = Some(inputs);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    pub fn observer(mut self, observer: impl Presentation + 'static) -> Self {
        self.events.register(Box::new(observer));
        self
    }

    pub fn build(self) -> Result<BattleSession, ConfigError> {
        let speed = SpeedControl::new(self.settings.speed)
            .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
        self.outcomes.validate()?;

        let pause = PauseCoordinator::new();
        let clock = BattleClock::new(speed, pause.clone(), self.settings.tick());
        let rng = match self.settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::seed_from_u64(rand::random()),
        };

        Ok(BattleSession {
            settings: self.settings,
            outcomes: self.outcomes,
            pause,
            clock,
            registry: self.registry.unwrap_or_else(MinigameRegistry::with_defaults),
            inputs: self.inputs.unwrap_or_default(),
            rng,
            events: self.events,
        })
    }
}
