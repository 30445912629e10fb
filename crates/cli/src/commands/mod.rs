//! CLI command implementations.

pub mod cart;

use rocketshoes_cart::{
    ApiClient, ApiError, CartConfig, CartError, CartStore, ConfigError, FileStorage,
};
use thiserror::Error;

/// Store type every command operates on.
pub type Store = CartStore<ApiClient, FileStorage>;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// The store rejected the request and raised notifications.
    #[error("{0} notification(s) raised")]
    Rejected(usize),
}

/// Build the store from environment configuration.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the persisted cart cannot
/// be read.
pub fn open_store() -> Result<Store, CliError> {
    let config = CartConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");

    let api = ApiClient::new(&config.api)?;
    let storage = FileStorage::new(&config.storage_path);
    Ok(CartStore::open(api, storage, config.storage_key)?)
}
