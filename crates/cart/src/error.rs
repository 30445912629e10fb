//! Cart store error type.
//!
//! The notifying store operations never return these; they are converted
//! to [`Notification`](crate::Notification)s at the operation boundary. The
//! `try_*` operations return them as-is.

use rocketshoes_core::ProductId;
use thiserror::Error;

use crate::api::ApiError;
use crate::storage::StorageError;

/// Errors a cart mutation can fail with.
#[derive(Debug, Error)]
pub enum CartError {
    /// Requested quantity exceeds the available stock.
    #[error("Product {product_id} is out of stock: requested {requested}, available {available}")]
    OutOfStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },

    /// Product is not in the cart.
    #[error("Product {0} is not in the cart")]
    NotFound(ProductId),

    /// Requested quantity is zero or negative.
    #[error("Amount for product {product_id} must be at least 1 (got {amount})")]
    NonPositiveAmount { product_id: ProductId, amount: i64 },

    /// Stock or catalog lookup failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Persisting the snapshot failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Snapshot could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
