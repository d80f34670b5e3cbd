//! Remote order and profile service

use async_trait::async_trait;
use mockall::automock;

use crate::{
    domain::{
        cart::models::Product,
        gift_cards::models::{GiftCards, IssuedGiftCard, NewGiftCard, RedeemedGiftCard},
        orders::models::{Order, OrderRequest},
        session::models::{Credentials, Registration, User},
    },
    ids::ProductId,
};

pub mod errors;
mod http;
pub mod models;

pub use errors::RemoteError;
pub use http::{HttpRemoteConfig, HttpRemoteService};
pub use models::AuthResponse;

/// The ordering backend.
#[automock]
#[async_trait]
pub trait RemoteService: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, RemoteError>;

    /// Create an account and sign in.
    async fn register(&self, registration: &Registration) -> Result<AuthResponse, RemoteError>;

    /// Fetch the profile behind `token`.
    async fn profile(&self, token: &str) -> Result<User, RemoteError>;

    /// Place an order. Point totals in the response are authoritative.
    async fn create_order(&self, token: &str, order: &OrderRequest)
    -> Result<Order, RemoteError>;

    /// List the products currently on sale.
    async fn products(&self) -> Result<Vec<Product>, RemoteError>;

    /// Fetch a single product.
    async fn product(&self, id: ProductId) -> Result<Product, RemoteError>;

    /// Buy a gift card for someone else.
    async fn create_gift_card(
        &self,
        token: &str,
        card: &NewGiftCard,
    ) -> Result<IssuedGiftCard, RemoteError>;

    /// Gift cards the user sent and received.
    async fn gift_cards(&self, token: &str) -> Result<GiftCards, RemoteError>;

    /// Redeem a gift card by code.
    async fn redeem_gift_card(
        &self,
        token: &str,
        code: &str,
    ) -> Result<RedeemedGiftCard, RemoteError>;
}
