//! Persistence - Flat snapshot handed to an external save system

mod store;

pub use store::{JsonFileSnapshotStore, MemorySnapshotStore, SnapshotStore};

use crate::types::CombatantId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Snapshot errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("snapshots can only be restored before the first turn")]
    BattleStarted,
    #[error("snapshot names unknown combatant `{0}`")]
    UnknownCombatant(CombatantId),
    #[error("stats version mismatch for `{id}`: snapshot {saved}, live {live}")]
    StatsVersionMismatch {
        id: CombatantId,
        saved: u32,
        live: u32,
    },
    #[error("snapshot puts `{id}` on character {index}, which its roster lacks")]
    NoSuchCharacter { id: CombatantId, index: usize },
    #[error("malformed snapshot entry `{0}`")]
    Malformed(String),
    #[error("snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Saved state of one combatant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub combatant_id: CombatantId,
    pub current_health: u32,
    pub stats_version: u32,
    /// Roster index of the applied character; older saves omit it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_character: Option<usize>,
}

/// Fields collected for one id while reading flat pairs
#[derive(Default)]
struct PartialEntry {
    current_health: Option<u32>,
    stats_version: Option<u32>,
    active_character: Option<usize>,
}

/// Saved state of the whole battle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub combatants: Vec<CombatantSnapshot>,
}

impl BattleSnapshot {
    pub fn get(&self, id: &CombatantId) -> Option<&CombatantSnapshot> {
        self.combatants.iter().find(|c| &c.combatant_id == id)
    }

    /// Flatten to `<id>.current_health` / `<id>.stats_version` pairs,
    /// plus `<id>.active_character` when known
    pub fn to_key_values(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for entry in &self.combatants {
            map.insert(
                format!("{}.current_health", entry.combatant_id),
                entry.current_health.to_string(),
            );
            map.insert(
                format!("{}.stats_version", entry.combatant_id),
                entry.stats_version.to_string(),
            );
            if let Some(index) = entry.active_character {
                map.insert(format!("{}.active_character", entry.combatant_id), index.to_string());
            }
        }
        map
    }

    /// Rebuild from flat pairs; ids come back sorted
    pub fn from_key_values(map: &BTreeMap<String, String>) -> Result<Self, SnapshotError> {
        let mut entries: BTreeMap<String, PartialEntry> = BTreeMap::new();

        for (key, value) in map {
            let (id, field) = key
                .rsplit_once('.')
                .ok_or_else(|| SnapshotError::Malformed(key.clone()))?;
            let malformed = || SnapshotError::Malformed(format!("{}={}", key, value));

            let entry = entries.entry(id.to_string()).or_default();
            match field {
                "current_health" => entry.current_health = Some(value.parse().map_err(|_| malformed())?),
                "stats_version" => entry.stats_version = Some(value.parse().map_err(|_| malformed())?),
                "active_character" => entry.active_character = Some(value.parse().map_err(|_| malformed())?),
                _ => return Err(SnapshotError::Malformed(key.clone())),
            }
        }

        let combatants = entries
            .into_iter()
            .map(|(id, entry)| match (entry.current_health, entry.stats_version) {
                (Some(current_health), Some(stats_version)) => Ok(CombatantSnapshot {
                    combatant_id: CombatantId(id),
                    current_health,
                    stats_version,
                    active_character: entry.active_character,
                }),
                _ => Err(SnapshotError::Malformed(id)),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BattleSnapshot { combatants })
    }

    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }
}
