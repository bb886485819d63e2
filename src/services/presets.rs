//! Preferred countdown durations, persisted as pretty JSON

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::StoreError;

/// File name of the preset store inside the data directory
pub const PRESETS_FILE: &str = "preferred-times.json";

/// A named duration a surface can apply with one click
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub minutes: u64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub seconds: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl Preset {
    pub fn new(name: impl Into<String>, minutes: u64) -> Self {
        Self {
            name: name.into(),
            minutes,
            seconds: 0,
        }
    }
}

/// Presets used when no store exists yet or it cannot be read
pub fn default_presets() -> Vec<Preset> {
    vec![
        Preset::new("Quick Break", 5),
        Preset::new("Pomodoro", 25),
        Preset::new("Long Break", 15),
        Preset::new("Deep Work", 90),
    ]
}

/// Ordered list of presets with write-through persistence
#[derive(Debug)]
pub struct PresetStore {
    path: Option<PathBuf>,
    presets: Mutex<Vec<Preset>>,
}

impl PresetStore {
    /// Load presets from `path`, falling back to the defaults
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let presets = load_presets(&path);
        Self {
            path: Some(path),
            presets: Mutex::new(presets),
        }
    }

    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self {
            path: None,
            presets: Mutex::new(default_presets()),
        }
    }

    pub fn list(&self) -> Vec<Preset> {
        self.presets().clone()
    }

    pub fn get(&self, index: usize) -> Option<Preset> {
        self.presets().get(index).cloned()
    }

    /// Append a preset and persist the new list
    pub fn add(&self, preset: Preset) -> Result<Vec<Preset>, StoreError> {
        let mut presets = self.presets();
        info!("Saving preset '{}' ({}m {}s)", preset.name, preset.minutes, preset.seconds);
        presets.push(preset);

        if let Err(e) = self.save(&presets) {
            presets.pop();
            return Err(e);
        }
        Ok(presets.clone())
    }

    /// Remove the preset at `index` and persist the new list
    pub fn delete(&self, index: usize) -> Result<Preset, StoreError> {
        let mut presets = self.presets();
        if index >= presets.len() {
            return Err(StoreError::IndexOutOfRange { index, len: presets.len() });
        }

        let removed = presets.remove(index);
        if let Err(e) = self.save(&presets) {
            presets.insert(index, removed);
            return Err(e);
        }
        info!("Deleted preset '{}' at index {}", removed.name, index);
        Ok(removed)
    }

    fn save(&self, presets: &[Preset]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(presets)?;
        fs::write(path, json).map_err(|source| StoreError::WriteFile {
            path: path.clone(),
            source,
        })?;
        debug!("Wrote {} presets to {}", presets.len(), path.display());
        Ok(())
    }

    fn presets(&self) -> MutexGuard<'_, Vec<Preset>> {
        self.presets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_presets(path: &Path) -> Vec<Preset> {
    if !path.exists() {
        debug!("No preset file at {}, using defaults", path.display());
        return default_presets();
    }

    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(presets) => presets,
            Err(e) => {
                warn!("Preset file {} is corrupt ({}), using defaults", path.display(), e);
                default_presets()
            }
        },
        Err(e) => {
            warn!("Failed to read preset file {}: {}", path.display(), e);
            default_presets()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::scratch_dir;

    #[test]
    fn test_defaults_when_missing() {
        let dir = scratch_dir("presets-missing");
        let store = PresetStore::open(dir.join(PRESETS_FILE));
        assert_eq!(store.list(), default_presets());
        assert_eq!(store.get(1).unwrap().minutes, 25);
    }

    #[test]
    fn test_add_and_delete_persist() {
        let dir = scratch_dir("presets-persist");
        let path = dir.join(PRESETS_FILE);

        let store = PresetStore::open(&path);
        store.add(Preset::new("Tea", 3)).unwrap();
        let removed = store.delete(0).unwrap();
        assert_eq!(removed.name, "Quick Break");

        let reopened = PresetStore::open(&path);
        let names: Vec<_> = reopened.list().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["Pomodoro", "Long Break", "Deep Work", "Tea"]);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = scratch_dir("presets-corrupt");
        let path = dir.join(PRESETS_FILE);
        fs::create_dir_all(&dir).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(PresetStore::open(&path).list(), default_presets());
    }

    #[test]
    fn test_delete_out_of_range() {
        let store = PresetStore::in_memory();
        assert!(matches!(
            store.delete(4),
            Err(StoreError::IndexOutOfRange { index: 4, len: 4 })
        ));
        assert_eq!(store.list().len(), 4);
    }
}
