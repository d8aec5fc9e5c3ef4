//! AnyCart CLI - cart, checkout and purchase history from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in and inspect the session
//! anycart login -u ada@example.com -p hunter2
//! anycart whoami
//!
//! # Manage the cart
//! anycart cart add "Milk" --amount 2 --price 0.89
//! anycart cart list
//! anycart checkout --name "Groceries" --store "Corner Shop"
//!
//! # Review purchase history
//! anycart history list
//! anycart history show <id>
//! ```
//!
//! # Commands
//!
//! - `login` / `google-login` / `register` / `logout` / `whoami` - session
//! - `profile` - show and update the backend profile
//! - `cart` - manage the local cart
//! - `checkout` - persist the cart as a purchase
//! - `history` - list, inspect and delete purchases
//! - `currency` - the selected display currency

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing::error;

mod commands;
mod error;

use commands::Context;
use error::CliError;

#[derive(Parser)]
#[command(name = "anycart")]
#[command(author, version, about = "AnyCart command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in with username/email and password
    Login {
        /// Username or email
        #[arg(short, long)]
        username: String,

        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Sign in with a Google ID token
    GoogleLogin {
        /// ID token obtained from Google
        #[arg(long)]
        id_token: String,
    },
    /// Register a new account
    Register {
        /// First name
        #[arg(long)]
        first_name: String,

        /// Last name
        #[arg(long)]
        last_name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Password confirmation (defaults to the password)
        #[arg(long)]
        password2: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session's identity
    Whoami,
    /// Show or update the backend profile
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: commands::cart::CartAction,
    },
    /// Persist the current cart as a purchase and clear it
    Checkout {
        /// Name for the saved cart
        #[arg(long, default_value = "Purchase")]
        name: String,

        /// Store name
        #[arg(long, default_value = "")]
        store: String,

        /// Currency code (defaults to the selected display currency)
        #[arg(long)]
        currency: Option<String>,
    },
    /// List, inspect and delete purchases
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Show or change the selected display currency
    Currency {
        #[command(subcommand)]
        action: commands::currency::CurrencyAction,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        // A 401 that survived the one-shot refresh means the session is
        // gone; everything else is reported as-is.
        if let CliError::Client(client_error) = &e
            && client_error.is_unauthorized()
        {
            error!("Session expired. Run `anycart login` to sign in again.");
        } else {
            error!("{e}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = Context::from_env()?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::auth::login(&ctx, &username, &password).await
        }
        Commands::GoogleLogin { id_token } => commands::auth::google_login(&ctx, &id_token).await,
        Commands::Register {
            first_name,
            last_name,
            email,
            password,
            password2,
        } => {
            commands::auth::register(&ctx, &first_name, &last_name, &email, &password, password2)
                .await
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Profile { action } => commands::profile::run(&ctx, action).await,
        Commands::Cart { action } => commands::cart::run(&ctx, action).await,
        Commands::Checkout {
            name,
            store,
            currency,
        } => commands::cart::checkout(&ctx, &name, &store, currency.as_deref()).await,
        Commands::History { action } => commands::history::run(&ctx, action).await,
        Commands::Currency { action } => commands::currency::run(&ctx, &action),
    }
}
