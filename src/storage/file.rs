//! File-backed store
//!
//! All keys live in one JSON object on disk. Every write rewrites the whole
//! file through a temporary sibling and a rename, so a crash mid-write leaves
//! the previous contents intact.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::debug;

use crate::storage::{KeyValueStore, StoreError};

/// Durable store persisted as a single JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating an empty one if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the file exists but cannot be read, or
    /// [`StoreError::InvalidFile`] when it does not hold a JSON object of strings.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::InvalidFile {
                path: path.clone(),
                source,
            })?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        debug!(path = %path.display(), keys = entries.len(), "opened store file");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let raw = serde_json::to_string_pretty(entries).map_err(io::Error::other).map_err(io_error)?;

        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        fs::write(&temp, raw).map_err(io_error)?;
        fs::rename(&temp, &self.path).map_err(io_error)
    }

    fn update(&self, apply: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        apply(&mut next);

        self.flush(&next)?;
        *entries = next;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn missing_file_opens_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileStore::open(dir.path().join("store.json"))?;

        assert_eq!(store.get("token")?, None);

        Ok(())
    }

    #[test]
    fn values_survive_reopen() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("store.json");

        let store = FileStore::open(&path)?;
        store.set("token", "abc")?;
        store.set("user", "{\"id\":1}")?;
        store.remove("token")?;
        drop(store);

        let reopened = FileStore::open(&path)?;

        assert_eq!(reopened.get("token")?, None);
        assert_eq!(reopened.get("user")?, Some("{\"id\":1}".to_string()));

        Ok(())
    }

    #[test]
    fn rejects_non_object_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2, 3]")?;

        let result = FileStore::open(&path);

        assert!(
            matches!(result, Err(StoreError::InvalidFile { .. })),
            "expected InvalidFile, got {result:?}"
        );

        Ok(())
    }
}
