//! Product catalog errors.

use thiserror::Error;

use crate::{ids::ProductId, remote::RemoteError, storage::StoreError};

/// Errors raised by the product catalog.
#[derive(Debug, Error)]
pub enum ProductsError {
    /// The backend does not sell this product.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The backend failed and nothing usable was cached.
    #[error("product data is unavailable")]
    Unavailable(#[source] RemoteError),

    /// The product cache could not be read.
    #[error("storage error")]
    Storage(#[from] StoreError),
}
