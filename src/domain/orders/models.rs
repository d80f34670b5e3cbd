//! Order Models

use std::fmt;

use jiff::{Timestamp, civil::DateTime, tz::TimeZone};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::cart::models::{CartItem, Customizations},
    ids::{OrderId, ProductId},
    prices::Price,
};

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Accepted by the backend, not started.
    Pending,
    /// Being prepared.
    Processing,
    /// Handed over. Local orders start here.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// One product line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Ordered product.
    pub product_id: ProductId,
    /// Units.
    pub quantity: u32,
    /// Chosen options.
    #[serde(default)]
    pub customizations: Customizations,
    /// Free-text notes.
    #[serde(default)]
    pub notes: String,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id,
            quantity: item.quantity,
            customizations: item.customizations.clone(),
            notes: item.notes.clone(),
        }
    }
}

/// Order Model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Backend id, or a time-based id for local orders.
    pub id: OrderId,
    /// When the order was placed.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub order_date: Timestamp,
    /// Lifecycle state.
    pub status: OrderStatus,
    /// Amount charged after any points discount.
    pub total_amount: Price,
    /// Units across all lines.
    #[serde(default)]
    pub items_count: u32,
    /// Points credited.
    #[serde(default)]
    pub points_earned: u64,
    /// Points spent.
    #[serde(default)]
    pub points_used: u64,
    /// Ordered lines.
    #[serde(default)]
    pub items: Vec<OrderLine>,
    /// Table to serve, for table orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
}

/// Order payload sent to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Lines to order.
    pub items: Vec<OrderLine>,
    /// Whether to spend loyalty points.
    pub use_points: bool,
    /// Table to serve, for table orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<u32>,
}

impl OrderRequest {
    /// Total number of units across all lines.
    pub fn items_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }
}

/// Parse RFC 3339 or the backend's `YYYY-MM-DD HH:MM:SS` (UTC) format.
///
/// # Errors
///
/// Returns the RFC 3339 parse error when neither format matches.
pub fn parse_timestamp(value: &str) -> Result<Timestamp, jiff::Error> {
    value.parse::<Timestamp>().or_else(|error| {
        value
            .parse::<DateTime>()
            .and_then(|civil| civil.to_zoned(TimeZone::UTC))
            .map(|zoned| zoned.timestamp())
            .map_err(|_civil_error| error)
    })
}

pub(crate) fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
    let raw = String::deserialize(deserializer)?;

    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
