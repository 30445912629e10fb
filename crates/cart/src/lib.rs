//! RocketShoes Cart - client-side cart state management.
//!
//! # Architecture
//!
//! - [`CartStore`] owns the cart snapshot and is the only writer
//! - Stock and catalog lookups go through the [`StockLookup`] and
//!   [`ProductCatalog`] traits; [`ApiClient`] implements both over HTTP
//! - Snapshots are mirrored to a [`CartStorage`] key-value backend after every
//!   successful mutation
//! - Failures surface as [`Notification`]s on a broadcast channel, never as
//!   errors returned from the notifying operations
//!
//! # Example
//!
//! ```rust,ignore
//! use rocketshoes_cart::{ApiClient, CartConfig, CartStore, FileStorage};
//!
//! let config = CartConfig::from_env()?;
//! let api = ApiClient::new(&config.api)?;
//! let storage = FileStorage::new(&config.storage_path);
//! let store = CartStore::open(api, storage, &config.storage_key)?;
//!
//! let mut toasts = store.notifications();
//! store.add_product(ProductId::new(1)).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notification;
pub mod storage;
pub mod store;

pub use api::{ApiClient, ApiError, ProductCatalog, StockLookup};
pub use config::{ApiConfig, CartConfig, ConfigError};
pub use error::CartError;
pub use notification::{CartOperation, Notification, NotificationKind};
pub use storage::{CartStorage, FileStorage, MemoryStorage, StorageError};
pub use store::{CartStore, UpdateProductAmount};

pub use rocketshoes_core::{Cart, CartItem, Price, Product, ProductId, Stock};
