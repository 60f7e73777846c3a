use std::collections::{BTreeMap, HashMap};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::errors::StorageError;

pub const MENUS_KEY: &str = "fps_training_menus";
pub const CURRENT_MENU_KEY: &str = "fps_current_menu_id";
pub const LANGUAGE_KEY: &str = "fps_language";

/// String-to-string durable storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Keeps every key in a single JSON object file, rewritten on each change
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
}

impl FileKeyValueStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            path: AppDirs::storage_path(),
        }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Same file name with `suffix` appended, next to the store
    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map_or_else(|| OsString::from("storage"), OsString::from);
        name.push(suffix);
        self.path.with_file_name(name)
    }

    /// Starting point for a write. A file that can't be read is moved aside
    /// to `<name>.bak` so new writes are not blocked by it.
    fn read_for_write(&self) -> BTreeMap<String, String> {
        match self.read_all() {
            Ok(map) => map,
            Err(e) => {
                let backup = self.sibling(".bak");
                warn!(path = %self.path.display(), error = %e, "unreadable storage, starting over");
                if let Err(e) = fs::rename(&self.path, &backup) {
                    warn!(backup = %backup.display(), error = %e, "could not back up storage");
                }
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(map)?;
        // a crash mid-write leaves the old file intact
        let tmp = self.sibling(".tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Default for FileKeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.read_for_write();
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_for_write();
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}

/// Volatile store; nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    values: HashMap<String, String>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let mut store = FileKeyValueStore::with_path(dir.path().join("nested").join("storage.json"));

        assert_eq!(store.get(LANGUAGE_KEY).unwrap(), None);
        store.set(LANGUAGE_KEY, "en").unwrap();
        store.set(CURRENT_MENU_KEY, "menu_1").unwrap();
        assert_eq!(store.get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));

        let reopened = FileKeyValueStore::with_path(store.path());
        assert_eq!(reopened.get(CURRENT_MENU_KEY).unwrap().as_deref(), Some("menu_1"));

        store.remove(CURRENT_MENU_KEY).unwrap();
        assert_eq!(reopened.get(CURRENT_MENU_KEY).unwrap(), None);
        assert_eq!(reopened.get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));
    }

    #[test]
    fn file_store_reports_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, b"not json").unwrap();
        let store = FileKeyValueStore::with_path(&path);
        assert_matches!(store.get(MENUS_KEY), Err(StorageError::Json(_)));
    }

    #[test]
    fn file_store_writes_past_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, br#"{"fps_training_menus": "[]""#).unwrap();
        let mut store = FileKeyValueStore::with_path(&path);

        store.set(LANGUAGE_KEY, "ko").unwrap();

        let reopened = FileKeyValueStore::with_path(&path);
        assert_eq!(reopened.get(LANGUAGE_KEY).unwrap().as_deref(), Some("ko"));
        assert_eq!(reopened.get(MENUS_KEY).unwrap(), None);
        let backup = std::fs::read(dir.path().join("storage.json.bak")).unwrap();
        assert_eq!(backup, br#"{"fps_training_menus": "[]""#);
        assert!(!dir.path().join("storage.json.tmp").exists());
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryKeyValueStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }
}
