//! Local storage backends
//!
//! Key/value string storage with the semantics of the browser's
//! `localStorage`: every write is visible immediately and survives restarts
//! (for [`FileStorage`]).

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::error::{StorageError, StorageResult};

/// String key/value storage
pub trait LocalStorage: Send + Sync {
    /// Read a value
    fn get_item(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Delete a value (no-op if absent)
    fn remove_item(&self, key: &str) -> StorageResult<()>;

    /// All stored keys in sorted order
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Read a JSON value stored under `key`
pub fn get_json<T: DeserializeOwned>(
    storage: &dyn LocalStorage,
    key: &str,
) -> StorageResult<Option<T>> {
    match storage.get_item(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Store a value as JSON under `key`
pub fn set_json<T: Serialize + ?Sized>(
    storage: &dyn LocalStorage,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, &raw)
}

fn lock<T>(mutex: &Mutex<T>) -> StorageResult<MutexGuard<'_, T>> {
    mutex
        .lock()
        .map_err(|e| StorageError::Lock(e.to_string()))
}

/// Volatile storage, used by tests and one-shot renders
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.items)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        lock(&self.items)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        lock(&self.items)?.remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items)?.keys().cloned().collect())
    }
}

/// Storage persisted as a single JSON object on disk.
///
/// The whole map is rewritten on every mutation through a temporary file and
/// a rename, so a crash never leaves a half-written file behind.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl FileStorage {
    /// Default file name inside the data directory
    pub const FILE_NAME: &'static str = "local_storage.json";

    /// Open (or create on first write) the storage file at `path`
    pub fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();

        let items = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!(path = ?path, keys = items.len(), "Opened local storage");

        Ok(Self {
            path,
            items: Mutex::new(items),
        })
    }

    /// Open `local_storage.json` inside a data directory
    pub fn in_dir(data_dir: impl AsRef<Path>) -> StorageResult<Self> {
        Self::open(data_dir.as_ref().join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, items: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(items)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl LocalStorage for FileStorage {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(lock(&self.items)?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let mut items = lock(&self.items)?;
        items.insert(key.to_string(), value.to_string());
        self.save(&items)
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        let mut items = lock(&self.items)?;
        if items.remove(key).is_some() {
            self.save(&items)?;
        }
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(lock(&self.items)?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_memory_storage_roundtrip() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("cart").unwrap(), None);

        storage.set_item("cart", "[]").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.keys().unwrap(), vec!["cart".to_string()]);

        storage.remove_item("cart").unwrap();
        assert_eq!(storage.get_item("cart").unwrap(), None);
    }

    #[test]
    fn test_json_helpers() {
        let storage = MemoryStorage::new();
        set_json(&storage, "wishlist", &vec![3u32, 7]).unwrap();

        let restored: Option<Vec<u32>> = get_json(&storage, "wishlist").unwrap();
        assert_eq!(restored, Some(vec![3, 7]));

        storage.set_item("broken", "{not json").unwrap();
        assert!(get_json::<Vec<u32>>(&storage, "broken").is_err());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempdir().unwrap();

        {
            let storage = FileStorage::in_dir(dir.path()).unwrap();
            storage.set_item("preferred-language", "en").unwrap();
            storage.set_item("access_token", "abc").unwrap();
            storage.remove_item("access_token").unwrap();
        }

        let reopened = FileStorage::in_dir(dir.path()).unwrap();
        assert_eq!(
            reopened.get_item("preferred-language").unwrap().as_deref(),
            Some("en")
        );
        assert_eq!(reopened.get_item("access_token").unwrap(), None);
    }

    #[test]
    fn test_file_storage_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::open(dir.path().join("nested").join("ls.json")).unwrap();
        assert!(storage.keys().unwrap().is_empty());

        storage.set_item("k", "v").unwrap();
        assert!(storage.path().exists());
    }
}
