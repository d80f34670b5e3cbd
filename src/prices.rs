//! Prices

use std::{
    fmt,
    iter::Sum,
    ops::{Add, Deref},
    str::FromStr,
};

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso};
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use thiserror::Error;

/// Errors raised when converting a decimal amount into a [`Price`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PriceError {
    /// The amount was below zero.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),

    /// The amount does not fit in minor units.
    #[error("price is out of range: {0}")]
    OutOfRange(String),

    /// The amount could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// Represents a price in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    value: u64,
}

impl Price {
    /// A price of nothing.
    pub const ZERO: Self = Self::new(0);

    /// Creates a new Price from minor units.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Price { value }
    }

    /// Minor units (cents) held by this price.
    #[must_use]
    pub const fn to_minor_units(self) -> u64 {
        self.value
    }

    /// Whole currency units, rounded down.
    #[must_use]
    pub const fn whole_units(self) -> u64 {
        self.value / 100
    }

    /// Converts a decimal currency amount, rounding half away from zero to the cent.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] when the amount is negative or too large.
    pub fn from_decimal(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }

        amount
            .checked_mul(Decimal::ONE_HUNDRED)
            .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            .and_then(|cents| cents.to_u64())
            .map(Self::new)
            .ok_or_else(|| PriceError::OutOfRange(amount.to_string()))
    }

    /// Converts a floating point currency amount.
    ///
    /// # Errors
    ///
    /// Returns a [`PriceError`] when the amount is not finite, negative or too large.
    pub fn from_f64(amount: f64) -> Result<Self, PriceError> {
        let decimal =
            Decimal::from_f64(amount).ok_or_else(|| PriceError::Invalid(amount.to_string()))?;

        Self::from_decimal(decimal)
    }

    /// The amount in currency units.
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::from(self.value) / Decimal::ONE_HUNDRED
    }

    /// Multiplies a unit price by a quantity.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.value.checked_mul(u64::from(quantity)).map(Self::new)
    }

    /// Subtracts, stopping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self::new(self.value.saturating_sub(other.value))
    }

    /// The price as US dollars, for display.
    #[must_use]
    pub fn money(self) -> Money<'static, iso::Currency> {
        Money::from_minor(i64::try_from(self.value).unwrap_or(i64::MAX), iso::USD)
    }
}

impl Deref for Price {
    type Target = u64;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Self) -> Self::Output {
        Price::new(self.value.saturating_add(rhs.value))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.money())
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(value.trim().trim_start_matches('$'))
            .map_err(|error| PriceError::Invalid(error.to_string()))?;

        Self::from_decimal(decimal)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let amount = self
            .to_decimal()
            .to_f64()
            .ok_or_else(|| serde::ser::Error::custom("price is not representable"))?;

        serializer.serialize_f64(amount)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative currency amount")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Price, E> {
        Price::from_decimal(Decimal::from(value)).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Price, E> {
        Price::from_decimal(Decimal::from(value)).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Price, E> {
        Price::from_f64(value).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Price, E> {
        value.parse().map_err(E::custom)
    }
}
