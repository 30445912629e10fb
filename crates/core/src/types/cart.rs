//! Cart snapshot types.
//!
//! A [`Cart`] is an ordered list of [`CartItem`]s, unique by product id.
//! It serializes as a bare JSON array, which is the format kept in storage.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// A product held in the cart together with its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    #[serde(alias = "title")]
    pub name: String,
    pub price: Price,
    pub image: String,
    /// Units held. Always at least 1 while the item is in a cart.
    pub amount: u32,
}

impl CartItem {
    /// Build a cart line from catalog metadata.
    #[must_use]
    pub fn from_product(product: Product, amount: u32) -> Self {
        Self {
            id: product.id,
            name: product.name,
            price: product.price,
            image: product.image,
            amount,
        }
    }

    /// Unit price times amount.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.amount)
    }
}

/// An ordered collection of cart items, unique by product id.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from raw items, repairing anything that breaks the cart
    /// invariants.
    ///
    /// Later duplicates of an id are dropped (the first occurrence wins), as
    /// are items with an amount of zero. Returns the cart and the number of
    /// items discarded.
    #[must_use]
    pub fn repaired(items: Vec<CartItem>) -> (Self, usize) {
        let original_len = items.len();
        let mut seen = HashSet::with_capacity(original_len);
        let items: Vec<CartItem> = items
            .into_iter()
            .filter(|item| item.amount >= 1 && seen.insert(item.id))
            .collect();
        let dropped = original_len - items.len();
        (Self { items }, dropped)
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the item for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Whether the product is in the cart.
    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Units of the product currently held (zero when absent).
    #[must_use]
    pub fn amount_of(&self, id: ProductId) -> u32 {
        self.get(id).map_or(0, |item| item.amount)
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart holds no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all item amounts.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all item subtotals.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Insert an item, or replace the existing entry for the same id in place.
    pub fn upsert(&mut self, item: CartItem) {
        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Set the amount of an existing item. Returns `false` when absent.
    pub fn set_amount(&mut self, id: ProductId, amount: u32) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            return false;
        };
        item.amount = amount;
        true
    }

    /// Remove an item, returning it if it was present.
    pub fn remove(&mut self, id: ProductId) -> Option<CartItem> {
        let position = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(position))
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, amount: u32) -> CartItem {
        CartItem {
            id: ProductId::new(id),
            name: format!("Shoe {id}"),
            price: Price::from_cents(10_000),
            image: format!("https://cdn.example/{id}.jpg"),
            amount,
        }
    }

    #[test]
    fn test_serializes_as_bare_array() {
        let (cart, _) = Cart::repaired(vec![item(1, 2)]);
        let json = serde_json::to_value(&cart).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["amount"], 2);
        assert_eq!(json[0]["name"], "Shoe 1");
    }

    #[test]
    fn test_repaired_drops_duplicates_and_empty_lines() {
        let (cart, dropped) = Cart::repaired(vec![item(1, 2), item(2, 0), item(1, 5), item(3, 1)]);
        assert_eq!(dropped, 2);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.amount_of(ProductId::new(1)), 2);
        assert!(!cart.contains(ProductId::new(2)));
    }

    #[test]
    fn test_upsert_keeps_position() {
        let (mut cart, _) = Cart::repaired(vec![item(1, 1), item(2, 1)]);
        cart.upsert(item(1, 4));
        cart.upsert(item(3, 1));
        let ids: Vec<i32> = cart.items().iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(cart.amount_of(ProductId::new(1)), 4);
    }

    #[test]
    fn test_set_amount_absent() {
        let mut cart = Cart::new();
        assert!(!cart.set_amount(ProductId::new(9), 2));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_remove_leaves_others_untouched() {
        let (mut cart, _) = Cart::repaired(vec![item(1, 1), item(2, 3), item(3, 2)]);
        let removed = cart.remove(ProductId::new(2)).unwrap();
        assert_eq!(removed.amount, 3);
        assert_eq!(cart.items(), &[item(1, 1), item(3, 2)]);
        assert!(cart.remove(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_totals() {
        let (cart, _) = Cart::repaired(vec![item(1, 2), item(2, 1)]);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total(), Price::from_cents(30_000));
        assert_eq!(cart.get(ProductId::new(1)).unwrap().subtotal(), Price::from_cents(20_000));
    }
}
