//! Checkout service.
//!
//! Submits the cart to the backend and, when that fails for any reason,
//! completes the order on this device with the same point arithmetic. Either
//! way the caller gets one [`CheckoutOutcome`].

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use tracing::{info, warn};

use crate::{
    domain::{
        cart::{CartStore, models::CartItem},
        checkout::{
            errors::{CheckoutError, FallbackError},
            models::{CheckoutOutcome, OutcomeSource},
        },
        loyalty::Ledger,
        orders::{
            OrderHistory,
            models::{Order, OrderLine, OrderRequest, OrderStatus},
        },
        session::{SessionError, SessionStore},
    },
    notifications::Notifier,
    remote::RemoteService,
    storage::{Storage, StorageKey, StoreError},
};

/// Order reconciliation between the backend and local persistence.
pub struct CheckoutWorkflow {
    remote: Arc<dyn RemoteService>,
    storage: Storage,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
    ledger: Arc<Ledger>,
    orders: OrderHistory,
    notifier: Notifier,
    submitting: AtomicBool,
}

impl std::fmt::Debug for CheckoutWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutWorkflow")
            .field("submitting", &self.is_submitting())
            .finish_non_exhaustive()
    }
}

impl CheckoutWorkflow {
    /// Wire checkout to the services it reconciles.
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteService>,
        storage: Storage,
        session: Arc<SessionStore>,
        cart: Arc<CartStore>,
        ledger: Arc<Ledger>,
        notifier: Notifier,
    ) -> Self {
        Self {
            remote,
            orders: OrderHistory::new(storage.clone()),
            storage,
            session,
            cart,
            ledger,
            notifier,
            submitting: AtomicBool::new(false),
        }
    }

    /// Whether a checkout is running.
    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Place an order for the current cart.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] for an empty cart,
    /// [`CheckoutError::InProgress`] while another checkout runs,
    /// [`CheckoutError::NotAuthenticated`] without a session and
    /// [`CheckoutError::Fallback`] when local completion fails. The cart is
    /// left intact on every error.
    pub async fn checkout(
        &self,
        table_number: Option<u32>,
    ) -> Result<CheckoutOutcome, CheckoutError> {
        let _submitting =
            SubmitGuard::acquire(&self.submitting).ok_or(CheckoutError::InProgress)?;

        let items = self.cart.items();

        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let token = self.session.token().ok_or(CheckoutError::NotAuthenticated)?;

        let request = OrderRequest {
            items: items.iter().map(OrderLine::from).collect(),
            use_points: self.cart.use_points(),
            table_number,
        };

        let outcome = match self.remote.create_order(&token, &request).await {
            Ok(order) => self.reconcile_remote(order, request).await,
            Err(error) => {
                warn!(%error, "order submission failed, completing locally");

                match self.complete_locally(&items, request).await {
                    Ok(outcome) => outcome,
                    Err(FallbackError::Balance(SessionError::NotAuthenticated)) => {
                        return Err(CheckoutError::NotAuthenticated);
                    }
                    Err(error) => return Err(error.into()),
                }
            }
        };

        if let Err(error) = self.cart.clear() {
            warn!(%error, "could not clear cart after checkout");
        }

        info!(
            order_id = %outcome.order.id,
            source = ?outcome.source,
            points_earned = outcome.points_earned,
            points_used = outcome.points_used,
            "order placed"
        );

        self.notifier.success(outcome.message());

        Ok(outcome)
    }

    async fn reconcile_remote(&self, mut order: Order, request: OrderRequest) -> CheckoutOutcome {
        order.items_count = request.items_count();
        order.items = request.items;
        order.table_number = order.table_number.or(request.table_number);

        if let Err(error) = self.orders.record(&order) {
            warn!(%error, "could not cache order locally");
        }

        if let Err(error) = self.ledger.record_order(&order) {
            warn!(%error, "could not cache point history locally");
        }

        if let Err(error) = self.session.sync_profile().await {
            warn!(%error, "profile sync failed, applying points locally");
            self.apply_points_locally(&order).await;
        }

        CheckoutOutcome {
            points_earned: order.points_earned,
            points_used: order.points_used,
            order,
            source: OutcomeSource::Remote,
        }
    }

    async fn apply_points_locally(&self, order: &Order) {
        let used = self
            .session
            .current_points()
            .map_or(0, |balance| balance.min(order.points_used));

        if let Err(error) = self.session.commit_points(used, order.points_earned) {
            warn!(%error, "could not apply points locally");
            return;
        }

        if let Err(error) = self.session.get_profile().await {
            warn!(%error, "profile refresh failed");
        }
    }

    async fn complete_locally(
        &self,
        items: &[CartItem],
        request: OrderRequest,
    ) -> Result<CheckoutOutcome, FallbackError> {
        let unpriced = items.iter().filter(|item| item.product.is_none()).count();

        if unpriced > 0 {
            return Err(FallbackError::MissingProductData { lines: unpriced });
        }

        let balance = self
            .session
            .current_points()
            .map_err(FallbackError::Balance)?;

        let totals = self.cart.totals(balance);
        let now = Timestamp::now();

        let order = Order {
            id: self.orders.next_local_id(now)?,
            order_date: now,
            status: OrderStatus::Completed,
            total_amount: totals.total,
            items_count: items
                .iter()
                .fold(0_u32, |count, item| count.saturating_add(item.quantity)),
            points_earned: totals.points_to_earn,
            points_used: totals.points_to_use,
            items: request.items,
            table_number: request.table_number,
        };

        self.persist_locally(&order)?;

        if let Err(error) = self.session.get_profile().await {
            warn!(%error, "profile refresh failed");
        }

        Ok(CheckoutOutcome {
            points_earned: order.points_earned,
            points_used: order.points_used,
            order,
            source: OutcomeSource::LocalFallback,
        })
    }

    /// Write order, ledger entry and balance, restoring the histories if a
    /// later write fails.
    fn persist_locally(&self, order: &Order) -> Result<(), FallbackError> {
        let orders_before = self.storage.load_raw(StorageKey::UserOrders).map_err(into_orders)?;
        let history_before = self
            .storage
            .load_raw(StorageKey::PointHistory)
            .map_err(into_orders)?;

        let result = self
            .orders
            .record(order)
            .map_err(FallbackError::from)
            .and_then(|()| {
                self.ledger
                    .record_order(order)
                    .map(|_| ())
                    .map_err(FallbackError::from)
            })
            .and_then(|()| {
                self.session
                    .commit_points(order.points_used, order.points_earned)
                    .map(|_| ())
                    .map_err(FallbackError::Points)
            });

        if result.is_err() {
            self.restore_raw(StorageKey::UserOrders, orders_before.as_deref());
            self.restore_raw(StorageKey::PointHistory, history_before.as_deref());
        }

        result
    }

    fn restore_raw(&self, key: StorageKey, value: Option<&str>) {
        let restored = match value {
            Some(value) => self.storage.save_raw(key, value),
            None => self.storage.remove(key),
        };

        if let Err(error) = restored {
            warn!(%key, %error, "could not roll back local order data");
        }
    }
}

fn into_orders(error: StoreError) -> FallbackError {
    FallbackError::Orders(error.into())
}

struct SubmitGuard<'a>(&'a AtomicBool);

impl<'a> SubmitGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
