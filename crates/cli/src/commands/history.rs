//! Purchase history commands: list, show, delete.

use anycart_core::{Purchase, PurchaseId};
use clap::Subcommand;
use tracing::info;

use super::Context;
use crate::error::CliError;

/// History subcommands.
#[derive(Subcommand)]
pub enum HistoryAction {
    /// List purchases
    List {
        /// Only show purchases matching this text (name, store, id, ...)
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show one purchase with its items
    Show {
        /// Purchase id
        id: String,
    },
    /// Delete a purchase
    Delete {
        /// Purchase id
        id: String,
    },
}

/// Dispatch a history subcommand.
pub async fn run(ctx: &Context, action: HistoryAction) -> Result<(), CliError> {
    match action {
        HistoryAction::List { search } => list(ctx, search.as_deref()).await,
        HistoryAction::Show { id } => show(ctx, &id).await,
        HistoryAction::Delete { id } => delete(ctx, &id).await,
    }
}

/// Case-insensitive match over the fields a user would scan for.
fn matches_search(purchase: &Purchase, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    let haystack = format!(
        "{} {} {} {} {} {}",
        purchase.id,
        purchase.cart_name,
        purchase.store_name.as_deref().unwrap_or(""),
        purchase.completed_at.format("%Y-%m-%d %H:%M"),
        purchase.total(),
        purchase.currency
    );
    haystack.to_lowercase().contains(&needle)
}

async fn list(ctx: &Context, search: Option<&str>) -> Result<(), CliError> {
    let client = ctx.client()?;
    let purchases = client.list_purchases().await?;

    let filtered: Vec<_> = match search {
        Some(needle) => purchases
            .iter()
            .filter(|p| matches_search(p, needle))
            .collect(),
        None => purchases.iter().collect(),
    };

    if filtered.is_empty() {
        info!("No purchases");
        return Ok(());
    }
    for purchase in filtered {
        info!(
            "{}  {:<20} {:<16} {}  {} items  {}",
            purchase.id,
            purchase.cart_name,
            purchase.store_name.as_deref().unwrap_or("-"),
            purchase.completed_at.format("%Y-%m-%d %H:%M"),
            purchase.items_count,
            purchase.currency.format(purchase.total())
        );
    }
    Ok(())
}

async fn show(ctx: &Context, id: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    let purchase = client.get_purchase(&PurchaseId::from(id)).await?;

    info!(
        "{} - {} at {} ({})",
        purchase.id,
        purchase.cart_name,
        purchase.store_name.as_deref().unwrap_or("-"),
        purchase.completed_at.format("%Y-%m-%d %H:%M")
    );
    if !purchase.notes.is_empty() {
        info!("Notes: {}", purchase.notes);
    }
    for item in purchase.items.as_deref().unwrap_or_default() {
        info!(
            "  {:<24} x{:<4} {:>10}",
            item.name,
            item.quantity,
            purchase.currency.format(item.unit_price)
        );
    }
    info!("Total: {}", purchase.currency.format(purchase.total()));
    Ok(())
}

async fn delete(ctx: &Context, id: &str) -> Result<(), CliError> {
    let client = ctx.client()?;
    client.delete_purchase(&PurchaseId::from(id)).await?;
    info!("Deleted purchase {id}");
    Ok(())
}
