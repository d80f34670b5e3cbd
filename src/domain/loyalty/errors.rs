//! Loyalty errors.

use thiserror::Error;

use crate::{domain::session::SessionError, storage::StoreError};

/// Errors raised by the loyalty ledger.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The balance does not cover the reward.
    #[error("not enough points: {required} required, {available} available")]
    InsufficientPoints {
        /// Price of the reward.
        required: u64,
        /// Balance at commit time.
        available: u64,
    },

    /// No reward with this id in the catalog.
    #[error("reward {0} not found")]
    RewardNotFound(String),

    /// Another redemption has not finished yet.
    #[error("a redemption is already in progress")]
    RedemptionInProgress,

    /// No signed-in user.
    #[error("not logged in")]
    NotAuthenticated,

    /// The balance could not be read or updated.
    #[error("session error")]
    Session(#[source] SessionError),

    /// The point history could not be read or written.
    #[error("storage error")]
    Storage(#[from] StoreError),

    /// The reward catalog is invalid.
    #[error("reward catalog error")]
    Catalog(#[from] CatalogError),
}

impl From<SessionError> for LedgerError {
    fn from(error: SessionError) -> Self {
        match error {
            SessionError::NotAuthenticated => Self::NotAuthenticated,
            SessionError::InsufficientPoints {
                available,
                required,
            } => Self::InsufficientPoints {
                required,
                available,
            },
            SessionError::Storage(error) => Self::Storage(error),
            other => Self::Session(other),
        }
    }
}

/// Errors raised while loading a reward catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The YAML does not describe a list of rewards.
    #[error("invalid reward catalog")]
    Parse(#[from] serde_norway::Error),

    /// Two rewards share an id.
    #[error("reward id {0} is listed more than once")]
    DuplicateId(u32),
}
