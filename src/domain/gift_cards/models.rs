//! Gift Card Models

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{domain::orders::models::deserialize_timestamp, ids::GiftCardId, prices::Price};

/// Gift card purchase for someone else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct NewGiftCard {
    /// Value loaded onto the card.
    #[validate(custom(function = "positive_amount"))]
    pub amount: Price,

    /// Email address of the person receiving the card.
    #[validate(email(message = "Please enter a valid email address."))]
    pub receiver_email: String,

    /// Note shown to the receiver.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}

fn positive_amount(amount: &Price) -> Result<(), ValidationError> {
    if *amount == Price::ZERO {
        return Err(ValidationError::new("amount")
            .with_message("Gift card amount must be greater than 0".into()));
    }

    Ok(())
}

/// A gift card just bought.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IssuedGiftCard {
    /// Backend id.
    pub id: GiftCardId,
    /// Code the receiver redeems.
    pub code: String,
    /// Value on the card.
    pub amount: Price,
    /// Who receives the card.
    pub receiver_email: String,
    /// Last day the card can be redeemed.
    pub expiration_date: Date,
}

/// A gift card the user bought.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SentGiftCard {
    /// Backend id.
    pub id: GiftCardId,
    /// Redemption code.
    pub code: String,
    /// Who receives the card.
    pub receiver_email: String,
    /// Value on the card.
    pub amount: Price,
    /// Note for the receiver.
    #[serde(default)]
    pub message: Option<String>,
    /// When the card was bought.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: Timestamp,
    /// Last day the card can be redeemed.
    pub expiration_date: Date,
    /// Whether the receiver already redeemed it.
    pub is_redeemed: bool,
}

/// A gift card bought for the user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReceivedGiftCard {
    /// Backend id.
    pub id: GiftCardId,
    /// Redemption code.
    pub code: String,
    /// Display name of the buyer.
    pub sender_name: String,
    /// Email of the buyer.
    pub sender_email: String,
    /// Value on the card.
    pub amount: Price,
    /// Note from the buyer.
    #[serde(default)]
    pub message: Option<String>,
    /// When the card was bought.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: Timestamp,
    /// Last day the card can be redeemed.
    pub expiration_date: Date,
    /// Whether it was already redeemed.
    pub is_redeemed: bool,
}

/// Gift cards the user sent and received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GiftCards {
    /// Cards the user bought, newest first.
    #[serde(rename = "sent_gift_cards", default)]
    pub sent: Vec<SentGiftCard>,

    /// Cards bought for the user, newest first.
    #[serde(rename = "received_gift_cards", default)]
    pub received: Vec<ReceivedGiftCard>,
}

impl GiftCards {
    /// Combined value of received cards not yet redeemed and not expired on
    /// `today`.
    pub fn redeemable_balance(&self, today: Date) -> Price {
        self.received
            .iter()
            .filter(|card| !card.is_redeemed && card.expiration_date >= today)
            .map(|card| card.amount)
            .sum()
    }
}

/// A gift card that was just redeemed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedeemedGiftCard {
    /// Backend id.
    pub id: GiftCardId,
    /// Value credited.
    pub amount: Price,
    /// When the card was redeemed.
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub redeemed_at: Timestamp,
}
