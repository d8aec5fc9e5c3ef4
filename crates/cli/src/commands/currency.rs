//! Display-currency commands.

use anycart_core::{Currency, POPULAR_CURRENCIES};
use clap::Subcommand;
use tracing::info;

use super::Context;
use crate::error::CliError;

/// Currency subcommands.
#[derive(Subcommand)]
pub enum CurrencyAction {
    /// Show the selected display currency
    Get,
    /// Change the selected display currency
    Set {
        /// ISO 4217 code, e.g. EUR or USD
        code: String,
    },
    /// List commonly used currency codes
    Popular,
}

/// Dispatch a currency subcommand.
pub fn run(ctx: &Context, action: &CurrencyAction) -> Result<(), CliError> {
    match action {
        CurrencyAction::Get => {
            info!("{}", ctx.prefs.selected_currency());
            Ok(())
        }
        CurrencyAction::Set { code } => {
            let currency = Currency::parse(code)?;
            ctx.prefs.set_selected_currency(&currency);
            info!("Display currency set to {currency}");
            Ok(())
        }
        CurrencyAction::Popular => {
            for code in POPULAR_CURRENCIES {
                info!("{code}");
            }
            Ok(())
        }
    }
}
