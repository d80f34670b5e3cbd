use clap::{Args, Subcommand};

use barista::{
    context::AppContext,
    domain::cart::models::{CartItemId, Customizations, NewCartItem},
    ids::ProductId,
};

use crate::cli::output;

#[derive(Debug, Args)]
pub(crate) struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Add a product to the cart
    Add(AddArgs),
    /// Remove a cart line
    Remove(LineArgs),
    /// Change the quantity of a cart line
    Quantity(QuantityArgs),
    /// Preview what loyalty points would do for this cart
    Points,
    /// Show the cart
    Show(ShowArgs),
    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Product id
    product: ProductId,

    /// Units to add
    #[arg(short, long, default_value_t = 1)]
    quantity: u32,

    /// Customization as key=value, repeatable
    #[arg(short, long = "option", value_parser = parse_customization)]
    options: Vec<(String, String)>,

    /// Notes for the barista
    #[arg(long, default_value = "")]
    notes: String,
}

#[derive(Debug, Args)]
struct LineArgs {
    /// Line number as shown by `cart show`
    line: usize,
}

#[derive(Debug, Args)]
struct QuantityArgs {
    /// Line number as shown by `cart show`
    line: usize,

    /// Amount to add, negative to remove
    #[arg(allow_negative_numbers = true)]
    delta: i64,
}

#[derive(Debug, Args)]
pub(crate) struct ShowArgs {
    /// Price the cart as if loyalty points were spent
    #[arg(long)]
    use_points: bool,
}

pub(crate) async fn run(context: &AppContext, command: CartCommand) -> Result<(), String> {
    match command.command {
        CartSubcommand::Add(args) => add(context, args).await,
        CartSubcommand::Remove(args) => {
            let id = line_id(context, args.line)?;
            context
                .cart
                .remove_item(id)
                .map_err(|error| format!("could not update cart: {error}"))?;

            show(context, false).await
        }
        CartSubcommand::Quantity(args) => {
            let id = line_id(context, args.line)?;
            context
                .cart
                .change_quantity(id, args.delta)
                .map_err(|error| format!("could not update cart: {error}"))?;

            show(context, false).await
        }
        CartSubcommand::Points => points(context).await,
        CartSubcommand::Show(args) => show(context, args.use_points).await,
        CartSubcommand::Clear => {
            context
                .cart
                .clear()
                .map_err(|error| format!("could not clear cart: {error}"))?;

            println!("cart cleared");

            Ok(())
        }
    }
}

async fn add(context: &AppContext, args: AddArgs) -> Result<(), String> {
    let product = context
        .products
        .get(args.product)
        .await
        .map_err(|error| format!("could not load product {}: {error}", args.product))?
        .data;

    let item = context
        .cart
        .add_item(NewCartItem {
            customizations: args.options.into_iter().collect::<Customizations>(),
            notes: args.notes,
            ..NewCartItem::for_product(product, args.quantity)
        })
        .map_err(|error| format!("could not add to cart: {error}"))?;

    println!(
        "{} x{} in cart",
        item.product
            .as_ref()
            .map_or("item", |product| product.name.as_str()),
        item.quantity
    );

    Ok(())
}

async fn points(context: &AppContext) -> Result<(), String> {
    attach_products(context).await?;

    let balance = context
        .session
        .current_points()
        .map_err(|error| format!("could not read balance: {error}"))?;

    context.cart.set_use_points(true);
    let totals = context.cart.totals(balance);

    println!("balance: {balance}");
    println!("points_to_use: {}", totals.points_to_use);
    println!("points_discount: {}", totals.points_discount);
    println!("total_with_points: {}", totals.total);
    println!("points_to_earn: {}", totals.points_to_earn);

    Ok(())
}

pub(crate) async fn show(context: &AppContext, use_points: bool) -> Result<(), String> {
    if context.cart.is_empty() {
        println!("cart is empty");
        return Ok(());
    }

    attach_products(context).await?;
    context.cart.set_use_points(use_points);

    let balance = context.session.current_points().unwrap_or(0);

    println!(
        "{}",
        output::cart_table(&context.cart.items(), &context.cart.totals(balance))
    );

    Ok(())
}

/// Join cart rows with product data, from the cache when offline.
pub(crate) async fn attach_products(context: &AppContext) -> Result<(), String> {
    context
        .products
        .price_cart(&context.cart)
        .await
        .map_err(|error| format!("could not load product data: {error}"))?;

    Ok(())
}

fn line_id(context: &AppContext, line: usize) -> Result<CartItemId, String> {
    line.checked_sub(1)
        .and_then(|index| context.cart.items().get(index).map(|item| item.id))
        .ok_or_else(|| format!("no cart line {line}"))
}

fn parse_customization(value: &str) -> Result<(String, String), String> {
    value
        .split_once('=')
        .map(|(key, option)| (key.trim().to_string(), option.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected key=value, got `{value}`"))
}
