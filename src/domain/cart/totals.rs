//! Cart totals
//!
//! Ten loyalty points are worth one dollar off, and every whole dollar spent
//! earns one point. All arithmetic is on cents.

use crate::prices::Price;

/// Cents of discount bought by one loyalty point.
pub const CENTS_PER_POINT: u64 = 10;

/// Cents that must be spent to earn one loyalty point.
pub const CENTS_PER_EARNED_POINT: u64 = 100;

/// Derived cart amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CartTotals {
    /// Sum of line totals.
    pub subtotal: Price,

    /// Amount taken off by loyalty points.
    pub points_discount: Price,

    /// Amount payable.
    pub total: Price,

    /// Points the discount consumes.
    pub points_to_use: u64,

    /// Points the order earns.
    pub points_to_earn: u64,
}

impl CartTotals {
    /// Compute totals for `subtotal` against a balance of `balance` points.
    ///
    /// The discount never exceeds the subtotal and never uses more points than
    /// the balance holds.
    #[must_use]
    pub fn compute(subtotal: Price, balance: u64, use_points: bool) -> Self {
        let cents = subtotal.to_minor_units();

        let points_to_use = if use_points {
            balance.min(cents / CENTS_PER_POINT)
        } else {
            0
        };

        let points_discount = Price::new(points_to_use * CENTS_PER_POINT);

        Self {
            subtotal,
            points_discount,
            total: subtotal.saturating_sub(points_discount),
            points_to_use,
            points_to_earn: cents / CENTS_PER_EARNED_POINT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discount_is_capped_by_subtotal() {
        let totals = CartTotals::compute(Price::new(1250), 1000, true);

        assert_eq!(totals.points_to_use, 125);
        assert_eq!(totals.points_discount, Price::new(1250));
        assert_eq!(totals.total, Price::ZERO);
    }

    #[test]
    fn discount_is_capped_by_balance() {
        let totals = CartTotals::compute(Price::new(1250), 100, true);

        assert_eq!(totals.points_to_use, 100);
        assert_eq!(totals.points_discount, Price::new(1000));
        assert_eq!(totals.total, Price::new(250));
        assert_eq!(totals.points_to_earn, 12);
    }

    #[test]
    fn no_discount_without_use_points() {
        let totals = CartTotals::compute(Price::new(899), 500, false);

        assert_eq!(totals.points_to_use, 0);
        assert_eq!(totals.points_discount, Price::ZERO);
        assert_eq!(totals.total, Price::new(899));
        assert_eq!(totals.points_to_earn, 8);
    }

    #[test]
    fn discount_bound_holds_across_inputs() {
        for cents in [0, 1, 9, 10, 99, 100, 1249, 1250, 10_000] {
            for balance in [0, 1, 5, 99, 100, 125, 1000, u64::MAX] {
                for use_points in [false, true] {
                    let totals = CartTotals::compute(Price::new(cents), balance, use_points);

                    assert!(
                        totals.points_discount <= totals.subtotal,
                        "discount exceeds subtotal for {cents} cents / {balance} points"
                    );
                    assert!(
                        totals.points_to_use <= balance,
                        "discount uses more than {balance} points"
                    );
                    assert_eq!(
                        totals.total.to_minor_units(),
                        cents - totals.points_discount.to_minor_units(),
                        "total is not subtotal minus discount"
                    );
                }
            }
        }
    }
}
