//! Catalog and stock records as served by the backend API.

use serde::{Deserialize, Deserializer, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Product metadata from the catalog.
///
/// Older catalog payloads label the display name `title`; both spellings
/// are accepted on input and `name` is always written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(alias = "title")]
    pub name: String,
    pub price: Price,
    pub image: String,
}

/// Maximum purchasable quantity for a product.
///
/// An oversold product may be reported with a negative amount; it reads as
/// zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    #[serde(deserialize_with = "non_negative")]
    pub amount: u32,
}

impl Stock {
    /// Whether `requested` units can be held in a cart.
    #[must_use]
    pub const fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let amount = i64::deserialize(deserializer)?;
    Ok(u32::try_from(amount.max(0)).unwrap_or(u32::MAX))
}
