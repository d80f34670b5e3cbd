use clap::{Args, Subcommand};
use jiff::Zoned;

use barista::{
    context::AppContext,
    domain::gift_cards::{GiftCardError, models::NewGiftCard},
    prices::Price,
};

use crate::cli::{auth, output};

#[derive(Debug, Args)]
pub(crate) struct GiftCardCommand {
    #[command(subcommand)]
    command: GiftCardSubcommand,
}

#[derive(Debug, Subcommand)]
enum GiftCardSubcommand {
    /// Buy a gift card for someone
    Send(SendArgs),
    /// List gift cards you sent and received
    List,
    /// Redeem a gift card code
    Redeem(RedeemArgs),
}

#[derive(Debug, Args)]
struct SendArgs {
    /// Receiver's email address
    #[arg(long)]
    to: String,

    /// Amount, e.g. 25.00
    #[arg(long)]
    amount: Price,

    /// Personal message
    #[arg(long, default_value = "")]
    message: String,
}

#[derive(Debug, Args)]
struct RedeemArgs {
    /// Code printed on the gift card
    code: String,
}

pub(crate) async fn run(context: &AppContext, command: GiftCardCommand) -> Result<(), String> {
    match command.command {
        GiftCardSubcommand::Send(args) => {
            let issued = context
                .gift_cards
                .send(NewGiftCard {
                    amount: args.amount,
                    receiver_email: args.to,
                    message: args.message,
                })
                .await
                .map_err(|error| describe("could not send gift card", &error))?;

            println!("code: {}", issued.code);
            println!("expires: {}", issued.expiration_date);
        }
        GiftCardSubcommand::List => {
            let cards = context
                .gift_cards
                .list()
                .await
                .map_err(|error| describe("could not load gift cards", &error))?;

            println!("{}", output::gift_cards_table(&cards));
            println!(
                "redeemable: {}",
                cards.redeemable_balance(Zoned::now().date())
            );
        }
        GiftCardSubcommand::Redeem(args) => {
            context
                .gift_cards
                .redeem(&args.code)
                .await
                .map_err(|error| describe("could not redeem gift card", &error))?;
        }
    }

    Ok(())
}

fn describe(action: &str, error: &GiftCardError) -> String {
    match error {
        GiftCardError::Validation(errors) => format!("{action}: {}", auth::field_messages(errors)),
        other => format!("{action}: {other}"),
    }
}
