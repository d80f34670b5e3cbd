//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    backup::Backup,
    config::ClientConfig,
    domain::{
        cart::{CartError, CartStore},
        checkout::CheckoutWorkflow,
        gift_cards::GiftCardService,
        loyalty::{Ledger, RewardCatalog, errors::CatalogError},
        orders::OrderHistory,
        products::ProductCatalog,
        session::{SessionConfig, SessionError, SessionStore},
    },
    notifications::Notifier,
    remote::{HttpRemoteService, RemoteError, RemoteService},
    storage::{FileStore, KeyValueStore, Storage, StoreError},
};

/// Errors raised while wiring the client together.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The store file could not be opened.
    #[error("failed to open local store")]
    Storage(#[from] StoreError),

    /// The HTTP client could not be built.
    #[error("failed to build http client")]
    Remote(#[from] RemoteError),

    /// The persisted session could not be read.
    #[error("failed to restore session")]
    Session(#[from] SessionError),

    /// The persisted cart could not be read.
    #[error("failed to restore cart")]
    Cart(#[from] CartError),

    /// The embedded reward catalog is invalid.
    #[error("failed to load reward catalog")]
    Catalog(#[from] CatalogError),
}

/// Every service of the client, wired to one store and one backend.
#[derive(Clone)]
pub struct AppContext {
    /// Backend client shared by every service.
    pub remote: Arc<dyn RemoteService>,
    /// Local store shared by every service.
    pub storage: Storage,
    /// Token, user and balance.
    pub session: Arc<SessionStore>,
    /// The cart.
    pub cart: Arc<CartStore>,
    /// Point history and rewards.
    pub ledger: Arc<Ledger>,
    /// Orders placed from this device.
    pub orders: OrderHistory,
    /// Products, with a local copy for offline use.
    pub products: Arc<ProductCatalog>,
    /// Order placement.
    pub checkout: Arc<CheckoutWorkflow>,
    /// Gift cards.
    pub gift_cards: Arc<GiftCardService>,
    /// Dataset export and import.
    pub backup: Arc<Backup>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("storage", &self.storage)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Build the context from configuration: file-backed store and HTTP
    /// backend.
    ///
    /// # Errors
    ///
    /// Returns an error when the store file cannot be read or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &ClientConfig, notifier: Notifier) -> Result<Self, AppInitError> {
        let store = FileStore::open(config.storage.data_file.clone())?;
        let remote = HttpRemoteService::new(config.remote.http())?;

        Self::build(
            Arc::new(store),
            Arc::new(remote),
            notifier,
            SessionConfig::from(&config.session),
        )
    }

    /// Wire services over an arbitrary store and backend.
    ///
    /// # Errors
    ///
    /// Returns an error when persisted state cannot be read.
    pub fn build(
        store: Arc<dyn KeyValueStore>,
        remote: Arc<dyn RemoteService>,
        notifier: Notifier,
        session_config: SessionConfig,
    ) -> Result<Self, AppInitError> {
        let storage = Storage::new(store);

        let session = Arc::new(SessionStore::open(
            remote.clone(),
            storage.clone(),
            notifier.clone(),
            session_config,
        )?);
        let cart = Arc::new(CartStore::open(storage.clone())?);
        let ledger = Arc::new(Ledger::new(
            storage.clone(),
            session.clone(),
            RewardCatalog::builtin()?,
            notifier.clone(),
        ));
        let checkout = Arc::new(CheckoutWorkflow::new(
            remote.clone(),
            storage.clone(),
            session.clone(),
            cart.clone(),
            ledger.clone(),
            notifier.clone(),
        ));
        let products = Arc::new(ProductCatalog::new(
            remote.clone(),
            storage.clone(),
            notifier.clone(),
        ));
        let gift_cards = Arc::new(GiftCardService::new(
            remote.clone(),
            session.clone(),
            notifier,
        ));
        let backup = Arc::new(Backup::csv(storage.clone(), session.clone()));

        Ok(Self {
            remote,
            orders: OrderHistory::new(storage.clone()),
            storage,
            session,
            cart,
            ledger,
            products,
            checkout,
            gift_cards,
            backup,
        })
    }
}
