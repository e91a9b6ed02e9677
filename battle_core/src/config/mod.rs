//! Configuration - TOML battle files, validated on load

mod battle;

pub use battle::{default_battle, BattleConfig, BattleSettings, CombatantConfig};

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Configuration validation error: {0}")]
    ValidationError(String),
    #[error("Unknown minigame id: {0}")]
    UnknownMinigame(String),
    #[error("Minigame {id} could not be created: {reason}")]
    MinigameUnavailable { id: String, reason: String },
}

/// Config documents that check their own invariants once parsed
pub trait Validate {
    fn validate(&self) -> Result<(), ConfigError>;
}

/// Read, parse and validate a TOML file
pub fn load_toml<T: DeserializeOwned + Validate>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_toml(&content)
}

/// Parse and validate a TOML string
pub fn parse_toml<T: DeserializeOwned + Validate>(content: &str) -> Result<T, ConfigError> {
    let config: T = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_names_path() {
        let err = BattleConfig::load(Path::new("no/such/battle.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError { .. }));
        assert!(err.to_string().contains("no/such/battle.toml"));
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let err = parse_toml::<BattleConfig>("[[combatants]\nid =").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
