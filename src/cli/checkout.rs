use clap::Args;
use tracing::warn;

use barista::context::AppContext;

use crate::cli::{cart, output};

#[derive(Debug, Args)]
pub(crate) struct CheckoutArgs {
    /// Spend loyalty points on this order
    #[arg(long)]
    use_points: bool,

    /// Table to bring the order to
    #[arg(long)]
    table: Option<u32>,
}

pub(crate) async fn run(context: &AppContext, args: &CheckoutArgs) -> Result<(), String> {
    // Unpriced lines still go to the backend. Only a local completion needs prices.
    if let Err(error) = cart::attach_products(context).await {
        warn!(%error, "checking out without product data");
    }

    context.cart.set_use_points(args.use_points);

    let outcome = context
        .checkout
        .checkout(args.table)
        .await
        .map_err(|error| format!("checkout failed: {error}"))?;

    println!("{}", output::orders_table(std::slice::from_ref(&outcome.order)));
    println!("{}", outcome.message());

    Ok(())
}
