//! Checkout Models

use crate::domain::orders::models::Order;

/// How an order was completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeSource {
    /// Accepted by the backend.
    Remote,

    /// Completed on this device after the backend failed.
    LocalFallback,
}

/// Normalized result of a checkout, whichever path produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutOutcome {
    /// The placed order.
    pub order: Order,
    /// Points credited for this order.
    pub points_earned: u64,
    /// Points spent on this order.
    pub points_used: u64,
    /// Which path completed the order.
    pub source: OutcomeSource,
}

impl CheckoutOutcome {
    /// Message shown to the user.
    pub fn message(&self) -> String {
        let points = match (self.points_earned, self.points_used) {
            (0, 0) => String::new(),
            (earned, 0) => format!(" You earned {earned} points!"),
            (0, used) => format!(" You used {used} points."),
            (earned, used) => format!(" You earned {earned} points and used {used} points."),
        };

        let disclosure = match self.source {
            OutcomeSource::Remote => "",
            OutcomeSource::LocalFallback => " (Local storage fallback used)",
        };

        format!("Order placed successfully!{points}{disclosure}")
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;
    use crate::{
        domain::orders::models::OrderStatus,
        ids::OrderId,
        prices::Price,
    };

    fn outcome(points_earned: u64, points_used: u64, source: OutcomeSource) -> CheckoutOutcome {
        CheckoutOutcome {
            order: Order {
                id: OrderId(1),
                order_date: Timestamp::UNIX_EPOCH,
                status: OrderStatus::Completed,
                total_amount: Price::ZERO,
                items_count: 1,
                points_earned,
                points_used,
                items: Vec::new(),
                table_number: None,
            },
            points_earned,
            points_used,
            source,
        }
    }

    #[test]
    fn messages_report_points() {
        assert_eq!(
            outcome(12, 100, OutcomeSource::Remote).message(),
            "Order placed successfully! You earned 12 points and used 100 points."
        );
        assert_eq!(
            outcome(8, 0, OutcomeSource::Remote).message(),
            "Order placed successfully! You earned 8 points!"
        );
        assert_eq!(
            outcome(0, 30, OutcomeSource::Remote).message(),
            "Order placed successfully! You used 30 points."
        );
        assert_eq!(
            outcome(0, 0, OutcomeSource::Remote).message(),
            "Order placed successfully!"
        );
    }

    #[test]
    fn fallback_message_is_disclosed() {
        assert_eq!(
            outcome(8, 0, OutcomeSource::LocalFallback).message(),
            "Order placed successfully! You earned 8 points! (Local storage fallback used)"
        );
    }
}
