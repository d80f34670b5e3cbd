#![expect(clippy::print_stdout, reason = "commands write their results to stdout")]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::warn;

use barista::{
    config::{ClientConfig, LoggingConfig},
    context::AppContext,
    notifications::{self, Notification, NotificationReceiver, Notifier},
};

mod auth;
mod backup;
mod cart;
mod checkout;
mod gift_cards;
mod history;
mod output;
mod rewards;

#[derive(Debug, Parser)]
#[command(name = "barista", about = "Café ordering client", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: ClientConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Log in to your account
    Login(auth::LoginArgs),
    /// Create an account and log in
    Register(auth::RegisterArgs),
    /// End the current session
    Logout,
    /// Show the signed-in user
    Profile(auth::ProfileArgs),
    /// Inspect and edit the cart
    Cart(cart::CartCommand),
    /// Place an order for the cart
    Checkout(checkout::CheckoutArgs),
    /// List rewards and what they cost
    Rewards,
    /// Redeem a reward for points
    Redeem(rewards::RedeemArgs),
    /// Show the loyalty point history
    History,
    /// Show orders placed from this device
    Orders(history::OrdersArgs),
    /// Send, list and redeem gift cards
    GiftCard(gift_cards::GiftCardCommand),
    /// Write a dataset to a CSV file
    Export(backup::ExportArgs),
    /// Replace a dataset from a CSV file
    Import(backup::ImportArgs),
}

impl Commands {
    fn restores_session(&self) -> bool {
        !matches!(
            self,
            Self::Login(_) | Self::Register(_) | Self::Logout | Self::Export(_) | Self::Import(_)
        )
    }
}

impl Cli {
    pub(crate) fn logging(&self) -> &LoggingConfig {
        &self.config.logging
    }

    /// Run the command, reporting every notification it raised. A failure is
    /// reported as a [`Notification::Error`].
    pub(crate) async fn run(self) -> ExitCode {
        let (notifier, mut receiver) = Notifier::channel();

        let result = self.execute(notifier.clone()).await;
        report_failure(&result, &notifier);

        print_notifications(&mut receiver);

        if result.is_ok() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }

    async fn execute(self, notifier: Notifier) -> Result<(), String> {
        let context = AppContext::from_config(&self.config, notifier)
            .map_err(|error| format!("failed to start: {error}"))?;

        if self.command.restores_session()
            && let Err(error) = context.session.restore().await
        {
            warn!(%error, "could not restore session");
        }

        match self.command {
            Commands::Login(args) => auth::login(&context, args).await,
            Commands::Register(args) => auth::register(&context, args).await,
            Commands::Logout => auth::logout(&context),
            Commands::Profile(args) => auth::profile(&context, &args).await,
            Commands::Cart(command) => cart::run(&context, command).await,
            Commands::Checkout(args) => checkout::run(&context, &args).await,
            Commands::Rewards => rewards::list(&context),
            Commands::Redeem(args) => rewards::redeem(&context, &args).await,
            Commands::History => history::points(&context),
            Commands::Orders(args) => history::orders(&context, &args),
            Commands::GiftCard(command) => gift_cards::run(&context, command).await,
            Commands::Export(args) => backup::export(&context, &args),
            Commands::Import(args) => backup::import(&context, &args).await,
        }
    }
}

fn report_failure(result: &Result<(), String>, notifier: &Notifier) {
    if let Err(message) = result {
        notifier.error(message.as_str());
    }
}

fn print_notifications(receiver: &mut NotificationReceiver) {
    for notification in notifications::drain(receiver) {
        if let Notification::Error { message } = &notification {
            #[expect(clippy::print_stderr, reason = "command errors are reported on stderr")]
            {
                eprintln!("{message}");
            }
        } else {
            println!("* {notification}");
        }
    }
}
