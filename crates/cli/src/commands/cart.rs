//! Cart commands: add, edit, remove, clear, list, and checkout.

use std::time::Duration;

use anycart_core::{LineItem, NewPurchase};
use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::Context;
use crate::error::CliError;

/// Cart subcommands.
#[derive(Subcommand)]
pub enum CartAction {
    /// Add a product to the cart
    Add {
        /// Product name
        name: String,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        amount: u32,

        /// Unit price, e.g. 0.89
        #[arg(short, long)]
        price: String,
    },
    /// Edit a cart item by id (unspecified fields keep their value)
    Edit {
        /// Item id (see `cart list`)
        id: String,

        /// New product name
        #[arg(long)]
        name: Option<String>,

        /// New quantity
        #[arg(short, long)]
        amount: Option<u32>,

        /// New unit price
        #[arg(short, long)]
        price: Option<String>,
    },
    /// Remove a cart item by id
    Remove {
        /// Item id
        id: String,
    },
    /// Remove all items
    Clear,
    /// Show the cart and its total
    List {
        /// Keep running and reflect changes made by other processes
        #[arg(long)]
        watch: bool,
    },
}

/// Dispatch a cart subcommand.
pub async fn run(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    match action {
        CartAction::Add {
            name,
            amount,
            price,
        } => add(ctx, &name, amount, &price),
        CartAction::Edit {
            id,
            name,
            amount,
            price,
        } => edit(ctx, &id, name, amount, price),
        CartAction::Remove { id } => remove(ctx, &id),
        CartAction::Clear => clear(ctx),
        CartAction::List { watch } => list(ctx, watch).await,
    }
}

fn parse_price(raw: &str) -> Result<Decimal, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidPrice(raw.to_owned()))
}

fn parse_item_id(raw: &str) -> Result<Uuid, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidItemId(raw.to_owned()))
}

fn add(ctx: &Context, name: &str, amount: u32, price: &str) -> Result<(), CliError> {
    let price = parse_price(price)?;
    let item = LineItem::new(name, amount, price)?;

    let cart = ctx.cart();
    cart.add_item(item.clone());

    let currency = ctx.prefs.selected_currency();
    info!(
        "Added {} x{} at {} (id {})",
        item.item_name,
        item.item_amount,
        currency.format(item.item_price),
        item.id
    );
    Ok(())
}

fn edit(
    ctx: &Context,
    id: &str,
    name: Option<String>,
    amount: Option<u32>,
    price: Option<String>,
) -> Result<(), CliError> {
    let id = parse_item_id(id)?;
    let cart = ctx.cart();

    let current = cart
        .items()
        .into_iter()
        .find(|item| item.id == id)
        .ok_or(CliError::NoSuchItem(id))?;

    let price = match price {
        Some(raw) => parse_price(&raw)?,
        None => current.item_price,
    };
    let updated = LineItem::with_id(
        id,
        name.unwrap_or(current.item_name),
        amount.unwrap_or(current.item_amount),
        price,
    )?;

    if !cart.edit_item(updated) {
        return Err(CliError::NoSuchItem(id));
    }
    info!("Updated item {id}");
    Ok(())
}

fn remove(ctx: &Context, id: &str) -> Result<(), CliError> {
    let id = parse_item_id(id)?;
    let cart = ctx.cart();
    if !cart.delete_item(id) {
        return Err(CliError::NoSuchItem(id));
    }
    info!("Removed item {id}");
    Ok(())
}

fn clear(ctx: &Context) -> Result<(), CliError> {
    let cart = ctx.cart();
    cart.clear();
    info!("Cart cleared");
    Ok(())
}

async fn list(ctx: &Context, watch: bool) -> Result<(), CliError> {
    let cart = ctx.cart();
    let currency = ctx.prefs.selected_currency();

    print_cart(&cart.items(), &currency);
    if !watch {
        return Ok(());
    }

    // Follow external changes until interrupted.
    cart.watch()?;
    info!("Watching for cart changes (Ctrl-C to stop)");
    let mut last = cart.items();
    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let items = cart.items();
        if items != last {
            print_cart(&items, &currency);
            last = items;
        }
    }
}

fn print_cart(items: &[LineItem], currency: &anycart_core::Currency) {
    if items.is_empty() {
        info!("Cart is empty");
        return;
    }
    for item in items {
        info!(
            "{}  {:<24} x{:<4} {:>10}  line {}",
            item.id,
            item.item_name,
            item.item_amount,
            currency.format(item.item_price),
            currency.format(item.line_total())
        );
    }
    info!(
        "Total: {}",
        currency.format(anycart_core::cart_total(items))
    );
}

/// Persist the current cart as a purchase, then clear the cart.
pub async fn checkout(
    ctx: &Context,
    name: &str,
    store: &str,
    currency: Option<&str>,
) -> Result<(), CliError> {
    let currency = match currency {
        Some(raw) => anycart_core::Currency::parse(raw)?,
        None => ctx.prefs.selected_currency(),
    };

    let cart = ctx.cart();
    let items = cart.items();
    if items.is_empty() {
        info!("Cart is empty; nothing to check out");
        return Ok(());
    }

    let client = ctx.client()?;
    let payload = NewPurchase::from_cart(name, store, currency.clone(), &items);
    let purchase = client.create_purchase(&payload).await?;

    // The purchase is durable server-side; the local cart can go.
    cart.clear();

    info!(
        "Saved purchase {} ({} items, total {})",
        purchase.id,
        items.len(),
        currency.format(purchase.total())
    );
    Ok(())
}
