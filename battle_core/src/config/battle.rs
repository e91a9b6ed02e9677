//! Battle configuration: timings, outcome multipliers and the roster

use super::{ConfigError, Validate};
use crate::combatant::{ActionProfile, Combatant};
use crate::outcome::OutcomeResolver;
use crate::stats::Stats;
use crate::types::{Element, Team};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Top-level battle file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BattleConfig {
    #[serde(default)]
    pub battle: BattleSettings,
    #[serde(default)]
    pub outcomes: OutcomeResolver,
    #[serde(default)]
    pub combatants: Vec<CombatantConfig>,
}

/// `[battle]` section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleSettings {
    /// Initial BattleSpeed
    #[serde(default = "default_speed")]
    pub speed: f64,
    /// Pause between turns, in scaled battle time
    #[serde(default = "default_turn_delay_ms")]
    pub turn_delay_ms: u64,
    /// Impact freeze after a hit, in real time
    #[serde(default = "default_hitstop_ms")]
    pub hitstop_ms: u64,
    #[serde(default = "default_minigame_deadline_secs")]
    pub minigame_deadline_secs: f64,
    /// Scheduler poll granularity
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// RNG seed; random when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Turn limit before the battle is called a draw
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
}

impl Default for BattleSettings {
    fn default() -> Self {
        BattleSettings {
            speed: default_speed(),
            turn_delay_ms: default_turn_delay_ms(),
            hitstop_ms: default_hitstop_ms(),
            minigame_deadline_secs: default_minigame_deadline_secs(),
            tick_ms: default_tick_ms(),
            seed: None,
            max_turns: default_max_turns(),
        }
    }
}

fn default_speed() -> f64 {
    1.0
}
fn default_turn_delay_ms() -> u64 {
    600
}
fn default_hitstop_ms() -> u64 {
    120
}
fn default_minigame_deadline_secs() -> f64 {
    5.0
}
fn default_tick_ms() -> u64 {
    16
}
fn default_max_turns() -> u32 {
    200
}

/// Longest skill check a config may ask for
pub const MAX_MINIGAME_DEADLINE_SECS: f64 = 3_600.0;

impl BattleSettings {
    pub fn turn_delay(&self) -> Duration {
        Duration::from_millis(self.turn_delay_ms)
    }

    pub fn hitstop(&self) -> Duration {
        Duration::from_millis(self.hitstop_ms)
    }

    pub fn minigame_deadline(&self) -> Duration {
        Duration::try_from_secs_f64(self.minigame_deadline_secs.clamp(0.0, MAX_MINIGAME_DEADLINE_SECS))
            .unwrap_or(Duration::ZERO)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// One `[[combatants]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantConfig {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub team: Team,
    #[serde(default)]
    pub minigame: Option<String>,
    #[serde(default)]
    pub raw_damage: f64,
    #[serde(default)]
    pub element: Option<Element>,
    #[serde(default)]
    pub regen_per_second: f64,
    /// Character roster; the first entry is applied at setup
    #[serde(default)]
    pub characters: Vec<Stats>,
}

impl CombatantConfig {
    /// Build the runtime combatant
    pub fn to_combatant(&self) -> Combatant {
        let name = if self.name.is_empty() {
            self.id.as_str()
        } else {
            self.name.as_str()
        };
        Combatant::new(self.id.as_str(), name, self.team, self.characters.clone())
            .with_action(ActionProfile {
                minigame: self.minigame.clone(),
                raw_damage: self.raw_damage,
                element: self.element,
            })
            .with_regen(self.regen_per_second)
    }
}

impl BattleConfig {
    /// Load and validate a battle file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        super::load_toml(path)
    }

    /// Parse and validate a battle TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        super::parse_toml(content)
    }

    /// Minigame ids referenced by the roster
    pub fn minigame_ids(&self) -> impl Iterator<Item = &str> {
        self.combatants.iter().filter_map(|c| c.minigame.as_deref())
    }

    pub fn to_combatants(&self) -> Vec<Combatant> {
        self.combatants.iter().map(CombatantConfig::to_combatant).collect()
    }
}

impl Validate for BattleConfig {
    /// Check every numeric invariant
    ///
    /// An empty character roster is allowed here: that combatant's turns
    /// are skipped at runtime.
    fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.battle;
        if !(settings.speed.is_finite() && settings.speed > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "battle.speed must be > 0 (got {})",
                settings.speed
            )));
        }
        let deadline = settings.minigame_deadline_secs;
        if !(deadline.is_finite() && deadline > 0.0 && deadline <= MAX_MINIGAME_DEADLINE_SECS) {
            return Err(ConfigError::ValidationError(format!(
                "battle.minigame_deadline_secs must be in (0, {}] (got {})",
                MAX_MINIGAME_DEADLINE_SECS,
                settings.minigame_deadline_secs
            )));
        }
        if settings.tick_ms == 0 {
            return Err(ConfigError::ValidationError(
                "battle.tick_ms must be at least 1".to_string(),
            ));
        }

        self.outcomes.validate()?;

        if self.combatants.is_empty() {
            return Err(ConfigError::ValidationError(
                "battle has no combatants".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for combatant in &self.combatants {
            if !seen.insert(combatant.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate combatant id `{}`",
                    combatant.id
                )));
            }
            if !(combatant.raw_damage.is_finite()) {
                return Err(ConfigError::ValidationError(format!(
                    "{}: raw_damage must be finite",
                    combatant.id
                )));
            }
            if !(combatant.regen_per_second.is_finite() && combatant.regen_per_second >= 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "{}: regen_per_second must be >= 0",
                    combatant.id
                )));
            }
            for stats in &combatant.characters {
                stats.validate()?;
            }
        }

        Ok(())
    }
}

/// The bundled demo battle
pub fn default_battle() -> BattleConfig {
    let toml = include_str!("../../config/battle.toml");
    BattleConfig::parse(toml).unwrap_or_else(|_| BattleConfig {
        combatants: vec![
            CombatantConfig {
                id: "hero".to_string(),
                name: "Hero".to_string(),
                team: Team::Player,
                minigame: Some("timing_bar".to_string()),
                raw_damage: 0.0,
                element: None,
                regen_per_second: 0.0,
                characters: vec![Stats::new(100, 18.0).with_name("Hero")],
            },
            CombatantConfig {
                id: "slime".to_string(),
                name: "Slime".to_string(),
                team: Team::Enemy,
                minigame: Some("auto".to_string()),
                raw_damage: 0.0,
                element: None,
                regen_per_second: 0.0,
                characters: vec![Stats::new(60, 8.0).with_name("Slime")],
            },
        ],
        ..Default::default()
    })
}
