//! Snapshot stores - the save-system seam

use super::{BattleSnapshot, SnapshotError};
use std::fs;
use std::path::PathBuf;

/// External save collaborator
pub trait SnapshotStore: Send {
    fn save(&mut self, snapshot: &BattleSnapshot) -> Result<(), SnapshotError>;

    /// `None` when nothing has been saved
    fn load(&self) -> Result<Option<BattleSnapshot>, SnapshotError>;
}

/// Keeps the last snapshot in memory
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    saved: Option<BattleSnapshot>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&mut self, snapshot: &BattleSnapshot) -> Result<(), SnapshotError> {
        self.saved = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<BattleSnapshot>, SnapshotError> {
        Ok(self.saved.clone())
    }
}

/// Writes the snapshot as pretty JSON to a single file
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSnapshotStore { path: path.into() }
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn save(&mut self, snapshot: &BattleSnapshot) -> Result<(), SnapshotError> {
        fs::write(&self.path, snapshot.to_json()?)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<BattleSnapshot>, SnapshotError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)?;
        Ok(Some(BattleSnapshot::from_json(&json)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::CombatantSnapshot;

    fn snapshot() -> BattleSnapshot {
        BattleSnapshot {
            combatants: vec![CombatantSnapshot {
                combatant_id: "hero".into(),
                current_health: 12,
                stats_version: 1,
                active_character: Some(0),
            }],
        }
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemorySnapshotStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save(&snapshot()).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot()));
    }

    #[test]
    fn test_json_file_store() {
        let path = std::env::temp_dir().join(format!("battle_core_snapshot_{}.json", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut store = JsonFileSnapshotStore::new(&path);
        assert_eq!(store.load().unwrap(), None);
        store.save(&snapshot()).unwrap();
        assert_eq!(store.load().unwrap(), Some(snapshot()));

        let _ = fs::remove_file(&path);
    }
}
