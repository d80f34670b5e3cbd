//! Cart service.
//!
//! The item list is the only state; counts and totals are derived from it on
//! every call. Each mutation writes the simplified snapshot before it becomes
//! visible, so a failed write leaves the cart as it was.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::{
    domain::cart::{
        errors::CartError,
        models::{CartItem, CartItemId, CartSnapshotItem, NewCartItem, Product},
        totals::CartTotals,
    },
    ids::ProductId,
    prices::Price,
    storage::{Storage, StorageKey},
};

#[derive(Debug, Default)]
struct CartState {
    items: Vec<CartItem>,
    use_points: bool,
}

/// Owner of the active cart.
#[derive(Debug)]
pub struct CartStore {
    storage: Storage,
    state: Mutex<CartState>,
}

impl CartStore {
    /// Open the cart, rehydrating the persisted snapshot with fresh local ids.
    ///
    /// An unreadable snapshot is discarded and the cart starts empty.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the store itself fails.
    pub fn open(storage: Storage) -> Result<Self, CartError> {
        let items: Vec<CartItem> = storage
            .load_or_discard::<Vec<CartSnapshotItem>>(StorageKey::CartItems)?
            .unwrap_or_default()
            .into_iter()
            .map(CartItem::from)
            .collect();

        debug!(items = items.len(), "cart restored");

        Ok(Self {
            storage,
            state: Mutex::new(CartState {
                items,
                use_points: false,
            }),
        })
    }

    fn state(&self) -> MutexGuard<'_, CartState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update<R>(&self, apply: impl FnOnce(&mut Vec<CartItem>) -> R) -> Result<R, CartError> {
        let mut state = self.state();
        let mut items = state.items.clone();
        let result = apply(&mut items);

        let snapshot: Vec<CartSnapshotItem> = items.iter().map(CartSnapshotItem::from).collect();
        self.storage.save(StorageKey::CartItems, &snapshot)?;

        state.items = items;

        Ok(result)
    }

    /// Add `item`, merging into a row with the same product and customizations.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidQuantity`] for a zero quantity, or
    /// [`CartError::Storage`] when the snapshot cannot be written.
    pub fn add_item(&self, item: NewCartItem) -> Result<CartItem, CartError> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        self.update(|items| {
            if let Some(existing) = items
                .iter_mut()
                .find(|existing| existing.is_mergeable_with(&item))
            {
                existing.quantity = existing.quantity.saturating_add(item.quantity);

                if existing.product.is_none() {
                    existing.product = item.product;
                }

                return existing.clone();
            }

            let added = CartItem {
                id: CartItemId::generate(),
                product_id: item.product_id,
                quantity: item.quantity,
                customizations: item.customizations,
                notes: item.notes,
                product: item.product,
            };

            items.push(added.clone());

            added
        })
    }

    /// Remove the row with local id `id`. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the snapshot cannot be written.
    pub fn remove_item(&self, id: CartItemId) -> Result<(), CartError> {
        self.update(|items| items.retain(|item| item.id != id))
    }

    /// Adjust the quantity of row `id` by `delta`, never going below 1.
    ///
    /// Returns the updated row, or `None` when no row has that id.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the snapshot cannot be written.
    pub fn change_quantity(
        &self,
        id: CartItemId,
        delta: i64,
    ) -> Result<Option<CartItem>, CartError> {
        self.update(|items| {
            let item = items.iter_mut().find(|item| item.id == id)?;

            let quantity = i64::from(item.quantity)
                .saturating_add(delta)
                .clamp(1, i64::from(u32::MAX));
            item.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);

            Some(item.clone())
        })
    }

    /// Empty the cart and remove the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Storage`] when the snapshot cannot be removed.
    pub fn clear(&self) -> Result<(), CartError> {
        let mut state = self.state();

        self.storage.remove(StorageKey::CartItems)?;
        state.items.clear();

        Ok(())
    }

    /// Choose whether loyalty points should be spent on this cart.
    pub fn set_use_points(&self, use_points: bool) {
        self.state().use_points = use_points;
    }

    /// Whether loyalty points will be spent.
    pub fn use_points(&self) -> bool {
        self.state().use_points
    }

    /// Current rows, in insertion order.
    pub fn items(&self) -> Vec<CartItem> {
        self.state().items.clone()
    }

    /// Row with local id `id`.
    pub fn item(&self, id: CartItemId) -> Option<CartItem> {
        self.state().items.iter().find(|item| item.id == id).cloned()
    }

    /// Whether the cart has no rows.
    pub fn is_empty(&self) -> bool {
        self.state().items.is_empty()
    }

    /// Total units across all rows.
    pub fn count(&self) -> u32 {
        self.state()
            .items
            .iter()
            .fold(0_u32, |count, item| count.saturating_add(item.quantity))
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Price {
        self.state().items.iter().map(CartItem::line_total).sum()
    }

    /// Totals against a balance of `balance` points.
    pub fn totals(&self, balance: u64) -> CartTotals {
        let state = self.state();
        let subtotal = state.items.iter().map(CartItem::line_total).sum();

        CartTotals::compute(subtotal, balance, state.use_points)
    }

    /// Fill in product data for rows that lack it.
    ///
    /// Returns the number of rows still without product data.
    pub fn attach_products(&self, mut lookup: impl FnMut(ProductId) -> Option<Product>) -> usize {
        let mut state = self.state();

        for item in state.items.iter_mut().filter(|item| item.product.is_none()) {
            item.product = lookup(item.product_id);
        }

        state
            .items
            .iter()
            .filter(|item| item.product.is_none())
            .count()
    }
}
