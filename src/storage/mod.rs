//! Persisted key-value storage.
//!
//! Every piece of offline state (session token, user profile, cart snapshot,
//! order and point history) lives under a fixed key as a JSON string. The
//! [`KeyValueStore`] port is deliberately tiny so it can be backed by a file on
//! disk, by memory in tests, or by anything else that can hold strings.

use std::{fmt, sync::Arc};

use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use tracing::warn;

mod errors;
mod file;
mod memory;

pub use errors::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Synchronous, process-local string store.
#[automock]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the value under `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Well-known storage slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// Bearer token of the active session.
    Token,

    /// Canonical current user record.
    User,

    /// Simplified cart snapshot.
    CartItems,

    /// Order history, newest first.
    UserOrders,

    /// Point history ledger, newest first.
    PointHistory,

    /// Opt-in saved login credentials.
    DevCredentials,

    /// Last product list fetched from the backend.
    Products,
}

impl StorageKey {
    /// Every key, in a stable order.
    pub const ALL: [StorageKey; 7] = [
        StorageKey::Token,
        StorageKey::User,
        StorageKey::CartItems,
        StorageKey::UserOrders,
        StorageKey::PointHistory,
        StorageKey::DevCredentials,
        StorageKey::Products,
    ];

    /// The raw key string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Token => "token",
            Self::User => "user",
            Self::CartItems => "cartItems",
            Self::UserOrders => "userOrders",
            Self::PointHistory => "pointHistory",
            Self::DevCredentials => "devCredentials",
            Self::Products => "products",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed JSON facade over a [`KeyValueStore`].
#[derive(Clone)]
pub struct Storage {
    inner: Arc<dyn KeyValueStore>,
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// Wrap a key-value store.
    #[must_use]
    pub fn new(inner: Arc<dyn KeyValueStore>) -> Self {
        Self { inner }
    }

    /// Storage backed by a fresh in-memory map.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Read and decode the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the stored JSON does not decode into
    /// `T`, or any error raised by the backing store.
    pub fn load<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.inner.get(key.as_str())? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { key, source })
    }

    /// Read a list stored under `key`, treating a missing value as empty.
    ///
    /// # Errors
    ///
    /// See [`Storage::load`].
    pub fn load_list<T: DeserializeOwned>(&self, key: StorageKey) -> Result<Vec<T>, StoreError> {
        self.load(key).map(Option::unwrap_or_default)
    }

    /// Like [`Storage::load`], but discards values that no longer decode.
    ///
    /// Corrupt data is removed from the store so it is not reported again.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backing store itself fails.
    pub fn load_or_discard<T: DeserializeOwned>(
        &self,
        key: StorageKey,
    ) -> Result<Option<T>, StoreError> {
        match self.load(key) {
            Err(StoreError::Corrupt { key, source }) => {
                warn!(%key, error = %source, "discarding unreadable stored value");
                self.remove(key)?;
                Ok(None)
            }
            other => other,
        }
    }

    /// Encode `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when encoding or writing fails.
    pub fn save<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })?;

        self.inner.set(key.as_str(), &raw)
    }

    /// Store `entry` at the front of the list under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the existing list cannot be read or the
    /// new list cannot be written.
    pub fn prepend<T: Serialize + DeserializeOwned>(
        &self,
        key: StorageKey,
        entry: T,
    ) -> Result<(), StoreError> {
        let mut entries: Vec<T> = self.load_list(key)?;
        entries.insert(0, entry);

        self.save(key, &entries)
    }

    /// Read the raw string under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing store cannot be read.
    pub fn load_raw(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
        self.inner.get(key.as_str())
    }

    /// Store a raw string under `key` without encoding it.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing store cannot be written.
    pub fn save_raw(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
        self.inner.set(key.as_str(), value)
    }

    /// Remove the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backing store cannot be written.
    pub fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
        self.inner.remove(key.as_str())
    }
}
