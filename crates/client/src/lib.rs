//! AnyCart client library.
//!
//! Everything the `anycart` frontend needs to talk to the backend and keep
//! local state:
//!
//! - [`config`] - environment-driven configuration
//! - [`storage`] - the durable key-value cells under the data directory
//! - [`session`] - access/refresh tokens and the cached user
//! - [`http`] - the authenticated request client with one-shot
//!   refresh-and-retry on 401
//! - [`cart`] - the cart state manager, mirrored to disk and reconciled
//!   with changes made by other processes
//! - [`prefs`] - the selected display currency
//! - [`api`] - typed wrappers for the backend endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use anycart_client::{ApiClient, ClientConfig, SessionStore, StorageDir};
//!
//! let config = ClientConfig::from_env()?;
//! let storage = StorageDir::new(config.data_dir.clone());
//! let session = SessionStore::new(storage.clone());
//! let client = ApiClient::new(&config, session.clone())?;
//!
//! let session = client.login("ada@example.com", "hunter2").await?;
//! let purchases = client.list_purchases().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod http;
mod jwt;
pub mod prefs;
pub mod session;
pub mod storage;

pub use api::{AvatarUpdate, ConfirmationSent, Me, RegisterPayload, UpdateMe};
pub use cart::CartStore;
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use http::{ApiClient, Auth};
pub use prefs::Prefs;
pub use session::{Session, SessionStore};
pub use storage::{StorageDir, keys};
