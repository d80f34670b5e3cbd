use clap::Args;

use barista::{
    context::AppContext,
    domain::{DataSource, Sourced},
    ids::OrderId,
};

use crate::cli::output;

#[derive(Debug, Args)]
pub(crate) struct OrdersArgs {
    /// Show a single order
    #[arg(long)]
    id: Option<OrderId>,
}

pub(crate) fn points(context: &AppContext) -> Result<(), String> {
    let history = context
        .ledger
        .history()
        .map_err(|error| format!("could not load point history: {error}"))?;

    if history.data.is_empty() {
        println!("no point history yet");
        return Ok(());
    }

    println!("{}", output::history_table(&history.data));
    disclose(&history);

    Ok(())
}

pub(crate) fn orders(context: &AppContext, args: &OrdersArgs) -> Result<(), String> {
    if let Some(id) = args.id {
        let order = context
            .orders
            .get(id)
            .map_err(|error| format!("could not load order: {error}"))?;

        println!("{}", output::orders_table(std::slice::from_ref(&order)));

        for line in &order.items {
            println!("- product {} x{}", line.product_id, line.quantity);
        }

        return Ok(());
    }

    let orders = context
        .orders
        .list()
        .map_err(|error| format!("could not load orders: {error}"))?;

    if orders.data.is_empty() {
        println!("no orders yet");
        return Ok(());
    }

    println!("{}", output::orders_table(&orders.data));
    disclose(&orders);

    Ok(())
}

fn disclose<T>(sourced: &Sourced<T>) {
    if sourced.source == DataSource::Local {
        println!("(from local storage)");
    }
}
