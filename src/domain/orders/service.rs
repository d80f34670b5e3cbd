//! Order history service.

use jiff::Timestamp;

use crate::{
    domain::{
        Sourced,
        orders::{errors::OrdersError, models::Order},
    },
    ids::OrderId,
    storage::{Storage, StorageKey},
};

/// Orders placed from this device, newest first.
#[derive(Debug, Clone)]
pub struct OrderHistory {
    storage: Storage,
}

impl OrderHistory {
    /// History kept in `storage`.
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Put `order` at the front of the history.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Storage`] when the history cannot be updated.
    pub fn record(&self, order: &Order) -> Result<(), OrdersError> {
        self.storage.prepend(StorageKey::UserOrders, order.clone())?;

        Ok(())
    }

    /// All orders, newest first, disclosed as local data.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Storage`] when the history cannot be read.
    pub fn list(&self) -> Result<Sourced<Vec<Order>>, OrdersError> {
        Ok(Sourced::local(self.storage.load_list(StorageKey::UserOrders)?))
    }

    /// The order with id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::NotFound`] when no such order was recorded.
    pub fn get(&self, id: OrderId) -> Result<Order, OrdersError> {
        self.list()?
            .data
            .into_iter()
            .find(|order| order.id == id)
            .ok_or(OrdersError::NotFound(id))
    }

    /// Replace the whole history.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Storage`] when the history cannot be written.
    pub fn replace(&self, orders: &[Order]) -> Result<(), OrdersError> {
        self.storage.save(StorageKey::UserOrders, orders)?;

        Ok(())
    }

    /// A time-based id for an order created on this device.
    ///
    /// Uses the epoch milliseconds of `now`, bumped past the newest recorded
    /// id so two orders in the same millisecond stay distinct.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Storage`] when the history cannot be read.
    pub fn next_local_id(&self, now: Timestamp) -> Result<OrderId, OrdersError> {
        let millis = u64::try_from(now.as_millisecond()).unwrap_or(0);

        let newest = self
            .list()?
            .data
            .iter()
            .map(|order| order.id.0)
            .max()
            .unwrap_or(0);

        Ok(OrderId(millis.max(newest.saturating_add(1))))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;
    use crate::{
        domain::{DataSource, orders::models::OrderStatus},
        prices::Price,
    };

    fn order(id: u64) -> Order {
        Order {
            id: OrderId(id),
            order_date: Timestamp::UNIX_EPOCH,
            status: OrderStatus::Completed,
            total_amount: Price::new(450),
            items_count: 1,
            points_earned: 4,
            points_used: 0,
            items: Vec::new(),
            table_number: None,
        }
    }

    #[test]
    fn record_prepends_and_discloses_local_source() -> TestResult {
        let history = OrderHistory::new(Storage::in_memory());

        history.record(&order(1))?;
        history.record(&order(2))?;

        let listed = history.list()?;

        assert_eq!(listed.source, DataSource::Local);
        assert_eq!(
            listed.data.iter().map(|order| order.id).collect::<Vec<_>>(),
            vec![OrderId(2), OrderId(1)]
        );

        Ok(())
    }

    #[test]
    fn get_unknown_order_is_not_found() -> TestResult {
        let history = OrderHistory::new(Storage::in_memory());
        history.record(&order(1))?;

        assert_eq!(history.get(OrderId(1))?.id, OrderId(1));
        assert!(
            matches!(history.get(OrderId(5)), Err(OrdersError::NotFound(OrderId(5)))),
            "expected NotFound"
        );

        Ok(())
    }

    #[test]
    fn local_ids_are_time_based_and_increasing() -> TestResult {
        let history = OrderHistory::new(Storage::in_memory());
        let now = Timestamp::from_millisecond(1_714_557_600_000)?;

        assert_eq!(history.next_local_id(now)?, OrderId(1_714_557_600_000));

        history.record(&order(1_714_557_600_000))?;

        assert_eq!(history.next_local_id(now)?, OrderId(1_714_557_600_001));

        Ok(())
    }
}
