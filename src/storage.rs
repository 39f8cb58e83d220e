//! Persistence for the to-do collection.
//!
//! The collection is written as a single JSON blob under one fixed key of a
//! string key-value store. Every save rewrites the whole blob.

use crate::error::{Result, TodoError};
use crate::task::Collection;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key the collection is stored under.
pub const STORAGE_KEY: &str = "@toDos";

/// String-keyed get/set store.
pub trait KeyValueStore {
    /// Returns `None` when `key` was never written.
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as a file inside `dir`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(TodoError::io(path, err)),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|err| TodoError::io(&self.dir, err))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(|err| TodoError::io(&tmp, err))?;
        fs::rename(&tmp, &path).map_err(|err| TodoError::io(&path, err))?;
        Ok(())
    }
}

/// Process-local store, nothing touches the disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Memory store whose writes can be made to fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore {
    inner: MemoryStore,
    pub(crate) fail_writes: std::cell::Cell<bool>,
}

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.get() {
            return Err(TodoError::io(
                "/x",
                std::io::Error::other("disk full"),
            ));
        }
        self.inner.set_item(key, value)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        (**self).set_item(key, value)
    }
}

/// Reads and writes the whole collection under [`STORAGE_KEY`].
#[derive(Debug)]
pub struct TodoStorage<S> {
    store: S,
}

impl<S: KeyValueStore> TodoStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the collection. A missing entry or a stored `null` is empty.
    pub fn load(&self) -> Result<Collection> {
        let Some(raw) = self.store.get_item(STORAGE_KEY)? else {
            debug!("no stored to-dos, starting empty");
            return Ok(Collection::new());
        };
        let parsed: Option<Collection> =
            serde_json::from_str(&raw).map_err(|source| TodoError::Corrupt {
                key: STORAGE_KEY.to_string(),
                source,
            })?;
        let collection = parsed.unwrap_or_default();
        debug!("loaded {} to-dos", collection.len());
        Ok(collection)
    }

    pub fn save(&self, collection: &Collection) -> Result<()> {
        let raw = serde_json::to_string(collection).map_err(TodoError::Serialize)?;
        self.store.set_item(STORAGE_KEY, &raw)?;
        debug!("saved {} to-dos", collection.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Category, Task, TaskId};
    use tempfile::TempDir;

    fn sample() -> Collection {
        let mut collection = Collection::new();
        collection.insert(TaskId(1), Task::new("Buy milk", Category::Work));
        let mut trip = Task::new("Lisbon", Category::Travel);
        trip.checked = true;
        collection.insert(TaskId(2), trip);
        collection
    }

    #[test]
    fn load_without_data_is_empty() {
        let storage = TodoStorage::new(MemoryStore::new());
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn load_of_stored_null_is_empty() {
        let store = MemoryStore::new();
        store.set_item(STORAGE_KEY, "null").unwrap();
        let storage = TodoStorage::new(store);
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn load_rejects_malformed_blob() {
        let store = MemoryStore::new();
        store.set_item(STORAGE_KEY, "{not json").unwrap();
        let storage = TodoStorage::new(store);
        assert!(matches!(storage.load(), Err(TodoError::Corrupt { .. })));
    }

    #[test]
    fn save_then_load_returns_same_collection() {
        let storage = TodoStorage::new(MemoryStore::new());
        let collection = sample();
        storage.save(&collection).unwrap();
        assert_eq!(storage.load().unwrap(), collection);
    }

    #[test]
    fn save_overwrites_previous_value() {
        let storage = TodoStorage::new(MemoryStore::new());
        storage.save(&sample()).unwrap();
        storage.save(&Collection::new()).unwrap();
        assert!(storage.load().unwrap().is_empty());
    }

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path());
        assert_eq!(store.get_item(STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn file_store_creates_directory_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("data"));
        store.set_item(STORAGE_KEY, "{}").unwrap();
        assert_eq!(store.get_item(STORAGE_KEY).unwrap().as_deref(), Some("{}"));
        assert!(store.path_for(STORAGE_KEY).ends_with("@toDos.json"));
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let store = FileStore::new("/data");
        assert_eq!(store.path_for("a/b c"), PathBuf::from("/data/a_b_c.json"));
    }
}
