//! Loyalty Models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{domain::orders::models::Order, ids::OrderId};

/// One movement of loyalty points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointHistoryEntry {
    /// Source order, or `0` for a reward redemption.
    pub order_id: OrderId,
    pub date: Timestamp,
    #[serde(default)]
    pub points_earned: u64,
    #[serde(default)]
    pub points_used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redemption_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_name: Option<String>,
}

impl PointHistoryEntry {
    /// Whether this entry records a reward redemption.
    pub fn is_redemption(&self) -> bool {
        self.order_id == OrderId(0)
    }
}

impl From<&Order> for PointHistoryEntry {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            date: order.order_date,
            points_earned: order.points_earned,
            points_used: order.points_used,
            redemption_code: None,
            reward_name: None,
        }
    }
}

/// Catalog entry as configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDefinition {
    /// Catalog id, unique.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Price in points.
    pub points_required: u64,
}

/// Catalog entry evaluated against a balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    /// Catalog id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// One-line description.
    pub description: String,
    /// Price in points.
    pub points_required: u64,
    /// Whether the balance covers the price.
    pub is_available: bool,
}

impl Reward {
    /// Evaluate `definition` for a user holding `balance` points.
    pub fn evaluate(definition: &RewardDefinition, balance: u64) -> Self {
        Self {
            id: definition.id,
            name: definition.name.clone(),
            description: definition.description.clone(),
            points_required: definition.points_required,
            is_available: balance >= definition.points_required,
        }
    }
}

/// Closest reward the user cannot afford yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextReward {
    /// The reward.
    pub reward: Reward,
    /// Points still missing.
    pub points_needed: u64,
}

/// Result of a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedemptionOutcome {
    /// The redeemed reward.
    pub reward: Reward,
    /// Code to show at the counter.
    pub code: String,
    /// History entry recording the spend.
    pub entry: PointHistoryEntry,
    /// Balance after the spend.
    pub remaining_points: u64,
}

impl RedemptionOutcome {
    /// Message shown to the user.
    pub fn message(&self) -> String {
        format!(
            "Successfully redeemed {}! Your code is {}.",
            self.reward.name, self.code
        )
    }
}
