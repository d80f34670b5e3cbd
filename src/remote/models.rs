//! Remote Models
//!
//! Response envelopes used by the backend.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{cart::models::Product, orders::models::Order, session::models::User};

/// Login and registration response.
#[derive(Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for later requests.
    pub access_token: String,

    /// The signed-in user.
    pub user: User,
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileResponse {
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GiftCardResponse<T> {
    pub gift_card: T,
}

#[derive(Debug, Serialize)]
pub(crate) struct RedeemRequest<'a> {
    pub code: &'a str,
}

/// Error body. Application errors use `error`, token errors use `msg`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    error: Option<String>,
    msg: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.msg)
    }
}
