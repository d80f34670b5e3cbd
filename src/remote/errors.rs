//! Remote service errors.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The backend could not be reached.
    #[error("could not reach the server")]
    Transport(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Message from the response body.
        message: String,
    },

    /// The response body was not what the backend is documented to send.
    #[error("unexpected response from server")]
    Decode(#[source] reqwest::Error),

    /// The HTTP client could not be built.
    #[error("invalid HTTP client configuration")]
    Client(#[source] reqwest::Error),
}

impl RemoteError {
    /// Whether the backend understood the request and refused it.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Status { status, .. } if (400..500).contains(status))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_decode() {
            Self::Decode(error)
        } else {
            Self::Transport(error)
        }
    }
}
