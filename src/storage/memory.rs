//! In-memory store

use std::{
    collections::BTreeMap,
    sync::{PoisonError, RwLock},
};

use crate::storage::{KeyValueStore, StoreError};

/// Volatile store backed by a map. Used for tests and `--ephemeral` runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`.
    #[must_use]
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.into(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn set_get_remove() -> TestResult {
        let store = MemoryStore::new();

        store.set("token", "abc")?;
        assert_eq!(store.get("token")?, Some("abc".to_string()));

        store.remove("token")?;
        assert_eq!(store.get("token")?, None);

        Ok(())
    }

    #[test]
    fn removing_missing_key_is_ok() -> TestResult {
        let store = MemoryStore::new();

        store.remove("nothing")?;

        Ok(())
    }

    #[test]
    fn with_entries_prepopulates() -> TestResult {
        let store = MemoryStore::with_entries([("user", "{}")]);

        assert_eq!(store.get("user")?, Some("{}".to_string()));

        Ok(())
    }
}
