//! Gift card errors.

use thiserror::Error;
use validator::ValidationErrors;

use crate::remote::RemoteError;

/// Errors raised by gift card operations.
#[derive(Debug, Error)]
pub enum GiftCardError {
    /// The purchase did not pass validation.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    /// Redemption was asked for without a code.
    #[error("Gift card code is required")]
    MissingCode,

    /// No session token is available.
    #[error("please log in to use gift cards")]
    NotAuthenticated,

    /// The backend refused the request, with its reason.
    #[error("{0}")]
    Rejected(String),

    /// The backend failed. Gift cards have no local copy to fall back on.
    #[error("gift cards are unavailable right now")]
    Unavailable(#[source] RemoteError),
}

impl From<RemoteError> for GiftCardError {
    fn from(error: RemoteError) -> Self {
        if error.is_rejection() {
            Self::Rejected(error.to_string())
        } else {
            Self::Unavailable(error)
        }
    }
}
