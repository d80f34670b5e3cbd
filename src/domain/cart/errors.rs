//! Cart errors.

use thiserror::Error;

use crate::storage::StoreError;

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// A new line must hold at least one unit.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// The cart snapshot could not be read or written.
    #[error("storage error")]
    Storage(#[from] StoreError),
}
