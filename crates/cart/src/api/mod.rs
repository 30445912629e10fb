//! Read-only collaborators the cart store depends on.
//!
//! # Traits
//!
//! - [`StockLookup`] - available quantity for a product
//! - [`ProductCatalog`] - product metadata
//!
//! [`ApiClient`] implements both against the backend REST API. Tests and
//! embedders can substitute their own implementations.

mod client;

use std::future::Future;

use rocketshoes_core::{Product, ProductId, Stock};
use thiserror::Error;

pub use client::ApiClient;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Source of truth for how many units of a product can be bought.
pub trait StockLookup: Send + Sync {
    /// Fetch the stock record for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, ApiError>> + Send;
}

/// Source of product metadata.
pub trait ProductCatalog: Send + Sync {
    /// Fetch the catalog entry for a product.
    fn product(&self, id: ProductId) -> impl Future<Output = Result<Product, ApiError>> + Send;
}
