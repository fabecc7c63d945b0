//! Key-value preference storage.
//!
//! Values are plain strings, like browser local storage. `FileStorage`
//! persists them as one JSON object so they outlive the session.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::{debug, warn};

pub const SELECTED_LANGUAGE_KEY: &str = "selectedLanguage";
pub const LEGACY_LANGUAGE_KEY: &str = "language";
pub const WEATHER_UNITS_KEY: &str = "weatherUnits";
pub const SOIL_TEST_DRAFT_KEY: &str = "soilTestDraft";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write preferences to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize preferences: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.set_many(&[(key, value)])
    }

    /// Write several keys at once. Either all of them are stored or none are.
    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Persist the selected language under both the current and the legacy key.
pub fn write_language_preference(
    storage: &dyn PreferenceStorage,
    code: &str,
) -> Result<(), StorageError> {
    storage.set_many(&[(SELECTED_LANGUAGE_KEY, code), (LEGACY_LANGUAGE_KEY, code)])
}

/// The last selected language, preferring the current key over the legacy one.
pub fn read_language_preference(storage: &dyn PreferenceStorage) -> Option<String> {
    storage
        .get(SELECTED_LANGUAGE_KEY)
        .filter(|v| !v.is_empty())
        .or_else(|| storage.get(LEGACY_LANGUAGE_KEY).filter(|v| !v.is_empty()))
}

/// Tab-scoped storage that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in pairs {
            entries.insert(key.to_string(), value.to_string());
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// Storage backed by a JSON object file, rewritten on every mutation.
///
/// The in-memory view only changes once the file write has succeeded.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Open (or lazily create) the preference file at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty; it is overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Ignoring corrupt preference file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read preference file {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };

        debug!("Loaded {} preferences from {}", entries.len(), path.display());
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(entries)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, json).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(key).cloned()
    }

    fn set_many(&self, pairs: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut updated = entries.clone();
        for (key, value) in pairs {
            updated.insert(key.to_string(), value.to_string());
        }
        self.flush(&updated)?;
        *entries = updated;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(key) {
            return Ok(());
        }
        let mut updated = entries.clone();
        updated.remove(key);
        self.flush(&updated)?;
        *entries = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== MemoryStorage Tests ====================

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(storage.get("weatherUnits").is_none());

        storage.set("weatherUnits", "imperial").unwrap();
        assert_eq!(storage.get("weatherUnits").as_deref(), Some("imperial"));

        storage.remove("weatherUnits").unwrap();
        assert!(storage.get("weatherUnits").is_none());
    }

    #[test]
    fn test_write_language_preference_sets_both_keys() {
        let storage = MemoryStorage::new();
        write_language_preference(&storage, "hi").unwrap();

        assert_eq!(storage.get(SELECTED_LANGUAGE_KEY).as_deref(), Some("hi"));
        assert_eq!(storage.get(LEGACY_LANGUAGE_KEY).as_deref(), Some("hi"));
    }

    #[test]
    fn test_read_language_preference_prefers_current_key() {
        let storage = MemoryStorage::new();
        storage.set(LEGACY_LANGUAGE_KEY, "mr").unwrap();
        storage.set(SELECTED_LANGUAGE_KEY, "te").unwrap();

        assert_eq!(read_language_preference(&storage).as_deref(), Some("te"));
    }

    #[test]
    fn test_read_language_preference_falls_back_to_legacy() {
        let storage = MemoryStorage::new();
        storage.set(LEGACY_LANGUAGE_KEY, "ml").unwrap();

        assert_eq!(read_language_preference(&storage).as_deref(), Some("ml"));
    }

    #[test]
    fn test_read_language_preference_empty() {
        let storage = MemoryStorage::new();
        storage.set(SELECTED_LANGUAGE_KEY, "").unwrap();
        assert!(read_language_preference(&storage).is_none());
    }

    // ==================== FileStorage Tests ====================

    #[test]
    fn test_file_storage_persists_across_instances() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("nested").join("prefs.json");

        let storage = FileStorage::open(&path);
        write_language_preference(&storage, "hi").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path);
        assert_eq!(reopened.get(SELECTED_LANGUAGE_KEY).as_deref(), Some("hi"));
        assert_eq!(reopened.get(LEGACY_LANGUAGE_KEY).as_deref(), Some("hi"));
    }

    #[test]
    fn test_file_storage_missing_file_starts_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileStorage::open(temp_dir.path().join("absent.json"));
        assert!(storage.get(SELECTED_LANGUAGE_KEY).is_none());
    }

    #[test]
    fn test_file_storage_corrupt_file_starts_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let storage = FileStorage::open(&path);
        assert!(storage.get(SELECTED_LANGUAGE_KEY).is_none());

        storage.set(WEATHER_UNITS_KEY, "metric").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("weatherUnits"));
    }

    #[test]
    fn test_file_storage_remove_rewrites_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("prefs.json");

        let storage = FileStorage::open(&path);
        storage.set(SOIL_TEST_DRAFT_KEY, "{}").unwrap();
        storage.remove(SOIL_TEST_DRAFT_KEY).unwrap();

        let reopened = FileStorage::open(&path);
        assert!(reopened.get(SOIL_TEST_DRAFT_KEY).is_none());
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_file_storage_failed_write_leaves_nothing_behind() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("not-a-dir");
        std::fs::write(&blocker, "plain file").unwrap();
        let path = blocker.join("prefs.json");

        let storage = FileStorage::open(&path);
        let result = write_language_preference(&storage, "hi");

        assert!(matches!(result, Err(StorageError::Io { .. })));
        assert!(storage.get(SELECTED_LANGUAGE_KEY).is_none());
        assert!(storage.get(LEGACY_LANGUAGE_KEY).is_none());
        assert!(FileStorage::open(&path).get(SELECTED_LANGUAGE_KEY).is_none());
    }

    #[test]
    fn test_file_storage_failed_remove_keeps_value() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("prefs");
        let path = dir.join("prefs.json");

        let storage = FileStorage::open(&path);
        storage.set(WEATHER_UNITS_KEY, "imperial").unwrap();

        // Replace the directory with a plain file so the next flush fails.
        std::fs::remove_dir_all(&dir).unwrap();
        std::fs::write(&dir, "plain file").unwrap();

        assert!(storage.remove(WEATHER_UNITS_KEY).is_err());
        assert_eq!(storage.get(WEATHER_UNITS_KEY).as_deref(), Some("imperial"));
    }
}
