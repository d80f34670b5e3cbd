//! Product catalog service.
//!
//! Products come from the backend. The last list seen is kept in the local
//! store so a cart can still be priced, and an order completed on this device,
//! while the backend is unreachable.

use std::{collections::HashMap, sync::Arc};

use tracing::warn;

use crate::{
    domain::{
        Sourced,
        cart::{CartStore, models::Product},
        products::errors::ProductsError,
    },
    ids::ProductId,
    notifications::{Notification, Notifier},
    remote::{RemoteError, RemoteService},
    storage::{Storage, StorageKey},
};

/// Products on sale, backed by a local copy of the last fetched list.
pub struct ProductCatalog {
    remote: Arc<dyn RemoteService>,
    storage: Storage,
    notifier: Notifier,
}

impl std::fmt::Debug for ProductCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductCatalog").finish_non_exhaustive()
    }
}

impl ProductCatalog {
    /// Catalog caching into `storage`.
    #[must_use]
    pub fn new(remote: Arc<dyn RemoteService>, storage: Storage, notifier: Notifier) -> Self {
        Self {
            remote,
            storage,
            notifier,
        }
    }

    /// Every product on sale.
    ///
    /// A successful fetch refreshes the cache. When the backend fails the
    /// cached list is returned as local data and [`Notification::OfflineMode`]
    /// is raised.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsError::Unavailable`] when the backend fails and
    /// nothing is cached.
    pub async fn list(&self) -> Result<Sourced<Vec<Product>>, ProductsError> {
        match self.remote.products().await {
            Ok(products) => {
                if let Err(error) = self.storage.save(StorageKey::Products, &products) {
                    warn!(%error, "could not cache product list");
                }

                Ok(Sourced::remote(products))
            }
            Err(error) => {
                let cached: Vec<Product> = self.storage.load_list(StorageKey::Products)?;

                if cached.is_empty() {
                    return Err(ProductsError::Unavailable(error));
                }

                self.offline(&error, cached.len());

                Ok(Sourced::local(cached))
            }
        }
    }

    /// The product with id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsError::NotFound`] when the backend does not know the
    /// product and [`ProductsError::Unavailable`] when the backend fails and
    /// the product is not cached.
    pub async fn get(&self, id: ProductId) -> Result<Sourced<Product>, ProductsError> {
        match self.remote.product(id).await {
            Ok(product) => {
                self.remember(&product);

                Ok(Sourced::remote(product))
            }
            Err(RemoteError::Status { status: 404, .. }) => Err(ProductsError::NotFound(id)),
            Err(error) => {
                let cached = self
                    .storage
                    .load_list::<Product>(StorageKey::Products)?
                    .into_iter()
                    .find(|product| product.id == id);

                let Some(product) = cached else {
                    return Err(ProductsError::Unavailable(error));
                };

                self.offline(&error, 1);

                Ok(Sourced::local(product))
            }
        }
    }

    /// Attach product data to cart rows restored without it.
    ///
    /// Returns the number of rows still unpriced. The backend is only asked
    /// when some row needs data.
    ///
    /// # Errors
    ///
    /// Returns [`ProductsError::Unavailable`] when rows need data and neither
    /// the backend nor the cache can supply it.
    pub async fn price_cart(&self, cart: &CartStore) -> Result<usize, ProductsError> {
        if cart.items().iter().all(|item| item.product.is_some()) {
            return Ok(0);
        }

        let products: HashMap<_, _> = self
            .list()
            .await?
            .data
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let missing = cart.attach_products(|id| products.get(&id).cloned());

        if missing > 0 {
            warn!(missing, "cart lines reference unknown products");
        }

        Ok(missing)
    }

    fn remember(&self, product: &Product) {
        let cached = self
            .storage
            .load_list::<Product>(StorageKey::Products)
            .and_then(|mut products| {
                match products.iter_mut().find(|cached| cached.id == product.id) {
                    Some(cached) => cached.clone_from(product),
                    None => products.push(product.clone()),
                }

                self.storage.save(StorageKey::Products, &products)
            });

        if let Err(error) = cached {
            warn!(%error, product_id = %product.id, "could not cache product");
        }
    }

    fn offline(&self, error: &RemoteError, count: usize) {
        warn!(%error, count, "backend unreachable, using cached products");

        self.notifier.notify(Notification::OfflineMode);
    }
}
