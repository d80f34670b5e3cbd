//! Checkout errors.

use thiserror::Error;

use crate::domain::{loyalty::LedgerError, orders::OrdersError, session::SessionError};

/// Errors raised by checkout. The cart is kept on every one of them.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// Another checkout has not finished yet.
    #[error("a checkout is already in progress")]
    InProgress,

    /// No session token is held.
    #[error("please log in to place an order")]
    NotAuthenticated,

    /// The backend failed and the order could not be completed locally.
    #[error("could not complete the order locally: {0}")]
    Fallback(#[from] FallbackError),
}

/// The local completion step that failed.
#[derive(Debug, Error)]
pub enum FallbackError {
    /// Some cart lines have no product data, so the total is unknown.
    #[error("prices are unknown for {lines} cart line(s)")]
    MissingProductData {
        /// Number of unpriced lines.
        lines: usize,
    },

    /// The balance could not be read.
    #[error("reading the balance failed")]
    Balance(#[source] SessionError),

    /// The order could not be recorded.
    #[error("saving the order failed")]
    Orders(#[from] OrdersError),

    /// The point history could not be recorded.
    #[error("saving the point history failed")]
    Ledger(#[from] LedgerError),

    /// The new balance could not be stored.
    #[error("updating the balance failed")]
    Points(#[source] SessionError),
}
