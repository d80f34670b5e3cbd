//! Session errors.

use thiserror::Error;
use validator::ValidationErrors;

use crate::{remote::RemoteError, storage::StoreError};

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend refused the request, with its reason.
    #[error("{0}")]
    Auth(String),

    /// The backend could not be reached or failed.
    #[error("network error")]
    Network(#[source] RemoteError),

    /// Login or registration input is malformed.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// No token or user is held.
    #[error("not logged in")]
    NotAuthenticated,

    /// Every profile load attempt failed and the session was ended.
    #[error("could not load your profile, you have been logged out")]
    ProfileUnavailable(#[source] Box<SessionError>),

    /// A point spend exceeds the stored balance.
    #[error("not enough points: {required} required, {available} available")]
    InsufficientPoints {
        /// Balance at commit time.
        available: u64,
        /// Points asked for.
        required: u64,
    },

    /// Session data could not be read or written.
    #[error("storage error")]
    Storage(#[from] StoreError),
}

impl From<RemoteError> for SessionError {
    fn from(error: RemoteError) -> Self {
        if error.is_rejection() {
            Self::Auth(error.to_string())
        } else {
            Self::Network(error)
        }
    }
}
