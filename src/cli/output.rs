//! Table rendering for command output.

use std::ops::Range;

use barista::domain::{
    cart::{CartTotals, models::CartItem},
    gift_cards::models::GiftCards,
    loyalty::models::{PointHistoryEntry, Reward},
    orders::models::Order,
};
use tabled::{
    Table,
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn finish(builder: Builder, numeric: Columns<Range<usize>>) -> Table {
    let mut table = builder.build();

    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(numeric, Alignment::right());

    table
}

pub(crate) fn cart_table(items: &[CartItem], totals: &CartTotals) -> String {
    let mut builder = Builder::default();

    builder.push_record(["#", "Item", "Options", "Qty", "Line Total"]);

    for (index, item) in items.iter().enumerate() {
        let name = item.product.as_ref().map_or_else(
            || format!("product {}", item.product_id),
            |product| product.name.clone(),
        );

        let mut options: Vec<String> = item
            .customizations
            .iter()
            .map(|(key, option)| format!("{key}: {option}"))
            .collect();

        if !item.notes.is_empty() {
            options.push(format!("note: {}", item.notes));
        }

        builder.push_record([
            (index + 1).to_string(),
            name,
            options.join(", "),
            item.quantity.to_string(),
            item.line_total().to_string(),
        ]);
    }

    let table = finish(builder, Columns::new(3..5));

    let mut summary = format!("{table}\nSubtotal: {}", totals.subtotal);

    if totals.points_to_use > 0 {
        summary.push_str(&format!(
            "\nPoints discount: -{} ({} points)",
            totals.points_discount, totals.points_to_use
        ));
    }

    summary.push_str(&format!(
        "\nTotal: {}\nPoints to earn: {}",
        totals.total, totals.points_to_earn
    ));

    summary
}

pub(crate) fn orders_table(orders: &[Order]) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Order", "Date", "Status", "Items", "Total", "Earned", "Used"]);

    for order in orders {
        builder.push_record([
            order.id.to_string(),
            order.order_date.strftime(DATE_FORMAT).to_string(),
            order.status.to_string(),
            order.items_count.to_string(),
            order.total_amount.to_string(),
            order.points_earned.to_string(),
            order.points_used.to_string(),
        ]);
    }

    finish(builder, Columns::new(3..7)).to_string()
}

pub(crate) fn history_table(entries: &[PointHistoryEntry]) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Date", "Activity", "Earned", "Used"]);

    for entry in entries {
        let activity = match (&entry.reward_name, &entry.redemption_code) {
            (Some(name), Some(code)) => format!("Redeemed {name} ({code})"),
            (Some(name), None) => format!("Redeemed {name}"),
            _ if entry.is_redemption() => "Redeemed reward".to_string(),
            _ => format!("Order #{}", entry.order_id),
        };

        builder.push_record([
            entry.date.strftime(DATE_FORMAT).to_string(),
            activity,
            format!("+{}", entry.points_earned),
            format!("-{}", entry.points_used),
        ]);
    }

    finish(builder, Columns::new(2..4)).to_string()
}

pub(crate) fn rewards_table(rewards: &[Reward]) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Id", "Reward", "Description", "Points", "Available"]);

    for reward in rewards {
        builder.push_record([
            reward.id.to_string(),
            reward.name.clone(),
            reward.description.clone(),
            reward.points_required.to_string(),
            yes_no(reward.is_available),
        ]);
    }

    finish(builder, Columns::new(3..4)).to_string()
}

pub(crate) fn gift_cards_table(cards: &GiftCards) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Code", "Direction", "Who", "Sent", "Expires", "Redeemed", "Amount"]);

    for card in &cards.sent {
        builder.push_record([
            card.code.clone(),
            "sent".to_string(),
            card.receiver_email.clone(),
            card.created_at.strftime(DATE_FORMAT).to_string(),
            card.expiration_date.to_string(),
            yes_no(card.is_redeemed),
            card.amount.to_string(),
        ]);
    }

    for card in &cards.received {
        builder.push_record([
            card.code.clone(),
            "received".to_string(),
            card.sender_name.clone(),
            card.created_at.strftime(DATE_FORMAT).to_string(),
            card.expiration_date.to_string(),
            yes_no(card.is_redeemed),
            card.amount.to_string(),
        ]);
    }

    finish(builder, Columns::new(6..7)).to_string()
}

fn yes_no(flag: bool) -> String {
    if flag { "yes" } else { "no" }.to_string()
}

#[cfg(test)]
mod tests {
    use barista::{
        domain::{
            gift_cards::models::SentGiftCard,
            orders::models::{Order, OrderStatus},
        },
        ids::{GiftCardId, OrderId},
        prices::Price,
    };
    use jiff::{Timestamp, civil::date};

    use super::*;

    #[test]
    fn orders_table_lists_amounts() {
        let order = Order {
            id: OrderId(501),
            order_date: Timestamp::UNIX_EPOCH,
            status: OrderStatus::Completed,
            total_amount: Price::new(250),
            items_count: 1,
            points_earned: 12,
            points_used: 100,
            items: Vec::new(),
            table_number: None,
        };

        let table = orders_table(&[order]);

        assert!(table.contains("1970-01-01 00:00"), "{table}");
        assert!(table.contains("$2.50"), "{table}");
        assert!(table.contains("completed"), "{table}");
    }

    #[test]
    fn gift_cards_table_shows_both_directions() {
        let cards = GiftCards {
            sent: vec![SentGiftCard {
                id: GiftCardId(1),
                code: "GC-AAAA1111".to_string(),
                receiver_email: "bea@example.com".to_string(),
                amount: Price::new(2500),
                message: None,
                created_at: Timestamp::UNIX_EPOCH,
                expiration_date: date(1971, 1, 1),
                is_redeemed: true,
            }],
            received: Vec::new(),
        };

        let table = gift_cards_table(&cards);

        assert!(table.contains("GC-AAAA1111"), "{table}");
        assert!(table.contains("1971-01-01"), "{table}");
        assert!(table.contains("$25.00"), "{table}");
    }
}
