//! Command implementations, one module per command group.

pub mod auth;
pub mod cart;
pub mod currency;
pub mod history;
pub mod profile;

use anycart_client::{ApiClient, CartStore, ClientConfig, Prefs, SessionStore, StorageDir};

use crate::error::CliError;

/// Everything a command needs: configuration plus the stores over the
/// data directory.
pub struct Context {
    /// Environment-driven configuration.
    pub config: ClientConfig,
    /// Session (tokens and cached user).
    pub session: SessionStore,
    /// User preferences.
    pub prefs: Prefs,
    storage: StorageDir,
}

impl Context {
    /// Build the context from the environment.
    pub fn from_env() -> Result<Self, CliError> {
        let config = ClientConfig::from_env()?;
        let storage = StorageDir::new(config.data_dir.clone());
        let session = SessionStore::new(storage.clone());
        let prefs = Prefs::new(storage.clone());
        Ok(Self {
            config,
            session,
            prefs,
            storage,
        })
    }

    /// An API client bound to this context's session store.
    pub fn client(&self) -> Result<ApiClient, CliError> {
        Ok(ApiClient::new(&self.config, self.session.clone())?)
    }

    /// The cart store, loaded from disk.
    pub fn cart(&self) -> CartStore {
        CartStore::open(self.storage.clone())
    }
}
