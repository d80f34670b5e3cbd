//! Storage errors.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::storage::StorageKey;

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored value no longer decodes into the expected shape.
    #[error("stored value for {key} is unreadable")]
    Corrupt {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded as JSON.
    #[error("could not encode value for {key}")]
    Encode {
        key: StorageKey,
        #[source]
        source: serde_json::Error,
    },

    /// The store file could not be read or written.
    #[error("failed to access store file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The store file exists but holds something other than a JSON object.
    #[error("store file {path} is not a JSON object")]
    InvalidFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The backing store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
