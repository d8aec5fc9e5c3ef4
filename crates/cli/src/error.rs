//! CLI-level errors: library errors plus client-side validation.

use thiserror::Error;

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Backend or storage-watch error from the client library.
    #[error("{0}")]
    Client(#[from] anycart_client::ClientError),

    /// Configuration problem.
    #[error("{0}")]
    Config(#[from] anycart_client::ConfigError),

    /// Invalid email entered on the command line.
    #[error("{0}")]
    Email(#[from] anycart_core::EmailError),

    /// Invalid line item entered on the command line.
    #[error("{0}")]
    Item(#[from] anycart_core::LineItemError),

    /// Invalid currency code entered on the command line.
    #[error("{0}")]
    Currency(#[from] anycart_core::CurrencyError),

    /// Unparseable price argument.
    #[error("Invalid price {0:?}: expected a decimal like 0.89")]
    InvalidPrice(String),

    /// Unparseable line-item ID argument.
    #[error("Invalid item id {0:?}")]
    InvalidItemId(String),

    /// The cart item to edit does not exist.
    #[error("No cart item with id {0}")]
    NoSuchItem(uuid::Uuid),

    /// An authenticated command was run without a stored session.
    #[error("Not logged in. Run `anycart login` first.")]
    NotLoggedIn,

    /// Avatar file could not be read.
    #[error("Could not read avatar file {path}: {source}")]
    AvatarUnreadable {
        /// Path given on the command line.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}
