//! Order history errors.

use thiserror::Error;

use crate::{ids::OrderId, storage::StoreError};

/// Errors raised by the order history.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// No order with this id was recorded.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The history could not be read or written.
    #[error("storage error")]
    Storage(#[from] StoreError),
}
