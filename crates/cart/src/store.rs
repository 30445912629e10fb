//! The cart store.
//!
//! [`CartStore`] is the single owner of the cart. Mutations run one at a
//! time behind a writer lock that is held across the stock and catalog
//! lookups, so two concurrent operations can never both read the same
//! snapshot and overwrite each other's result.
//!
//! Every successful mutation is written to storage first and only then
//! published, so a storage failure leaves the in-memory cart untouched.

use rocketshoes_core::{Cart, CartItem, ProductId};
use serde::Deserialize;
use tokio::sync::{Mutex, broadcast, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::api::{ProductCatalog, StockLookup};
use crate::error::CartError;
use crate::notification::{CartOperation, Notification, NotificationKind};
use crate::storage::CartStorage;

/// Buffered notifications per subscriber before the oldest are dropped.
const NOTIFICATION_CAPACITY: usize = 64;

/// Request to set the quantity of a product already in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

/// Client-side cart state container.
pub struct CartStore<A, S> {
    api: A,
    storage: S,
    storage_key: String,
    writer: Mutex<()>,
    snapshot: watch::Sender<Cart>,
    notifications: broadcast::Sender<Notification>,
}

impl<A, S> CartStore<A, S>
where
    A: StockLookup + ProductCatalog,
    S: CartStorage,
{
    /// Open a store, restoring the cart persisted under `storage_key`.
    ///
    /// A missing entry yields an empty cart. An entry that cannot be decoded
    /// is logged and ignored; it is overwritten by the next mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage backend cannot be read.
    pub fn open(api: A, storage: S, storage_key: impl Into<String>) -> Result<Self, CartError> {
        let storage_key = storage_key.into();
        let cart = load_snapshot(&storage, &storage_key)?;
        info!(items = cart.len(), key = %storage_key, "Cart restored");

        let (snapshot, _) = watch::channel(cart);
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);

        Ok(Self {
            api,
            storage,
            storage_key,
            writer: Mutex::new(()),
            snapshot,
            notifications,
        })
    }

    /// Current cart snapshot.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.snapshot.borrow().clone()
    }

    /// Watch every snapshot the store publishes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.snapshot.subscribe()
    }

    /// Receive notifications raised from now on.
    #[must_use]
    pub fn notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    // =========================================================================
    // Notifying operations
    // =========================================================================

    /// Add one unit of a product. Failures are reported as notifications.
    pub async fn add_product(&self, product_id: ProductId) {
        if let Err(e) = self.try_add_product(product_id).await {
            self.report(CartOperation::Add, &e);
        }
    }

    /// Remove a product entirely. Failures are reported as notifications.
    pub async fn remove_product(&self, product_id: ProductId) {
        if let Err(e) = self.try_remove_product(product_id).await {
            self.report(CartOperation::Remove, &e);
        }
    }

    /// Set the quantity of a product in the cart. Failures are reported as
    /// notifications, except a non-positive amount which is ignored.
    pub async fn update_product_amount(&self, request: UpdateProductAmount) {
        if let Err(e) = self.try_update_product_amount(request).await {
            self.report(CartOperation::Update, &e);
        }
    }

    // =========================================================================
    // Typed operations
    // =========================================================================

    /// Add one unit of a product, returning the new cart.
    ///
    /// # Errors
    ///
    /// Returns `OutOfStock` if the new amount exceeds stock, or the lookup or
    /// storage error that prevented the mutation. The cart is unchanged on
    /// error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn try_add_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let _writer = self.writer.lock().await;

        let stock = self.api.stock(product_id).await?;
        let product = self.api.product(product_id).await?;

        let mut cart = self.cart();
        let requested = cart.amount_of(product_id).saturating_add(1);
        if !stock.covers(requested) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: u64::from(requested),
                available: stock.amount,
            });
        }

        if !cart.set_amount(product_id, requested) {
            cart.upsert(CartItem::from_product(product, requested));
        }

        let cart = self.commit(cart)?;
        info!(amount = requested, "Product added to cart");
        Ok(cart)
    }

    /// Remove a product, returning the new cart.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product is not in the cart, or the storage
    /// error that prevented the mutation.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn try_remove_product(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let _writer = self.writer.lock().await;

        let mut cart = self.cart();
        if cart.remove(product_id).is_none() {
            return Err(CartError::NotFound(product_id));
        }

        let cart = self.commit(cart)?;
        info!("Product removed from cart");
        Ok(cart)
    }

    /// Set a product's quantity, returning the new cart.
    ///
    /// Stock is checked before the amount itself, so a stock lookup failure
    /// wins over a non-positive amount.
    ///
    /// # Errors
    ///
    /// Returns `OutOfStock`, `NonPositiveAmount`, `NotFound`, or the lookup
    /// or storage error that prevented the mutation.
    #[instrument(skip(self), fields(product_id = %request.product_id, amount = request.amount))]
    pub async fn try_update_product_amount(
        &self,
        request: UpdateProductAmount,
    ) -> Result<Cart, CartError> {
        let UpdateProductAmount { product_id, amount } = request;
        let _writer = self.writer.lock().await;

        let stock = self.api.stock(product_id).await?;
        if amount > i64::from(stock.amount) {
            return Err(CartError::OutOfStock {
                product_id,
                requested: amount.unsigned_abs(),
                available: stock.amount,
            });
        }

        let Ok(units @ 1..) = u32::try_from(amount) else {
            return Err(CartError::NonPositiveAmount { product_id, amount });
        };

        let mut cart = self.cart();
        if !cart.set_amount(product_id, units) {
            return Err(CartError::NotFound(product_id));
        }

        let cart = self.commit(cart)?;
        info!("Product amount updated");
        Ok(cart)
    }

    /// Empty the cart and delete its persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the snapshot could not be removed.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<(), CartError> {
        let _writer = self.writer.lock().await;
        self.storage.remove_item(&self.storage_key)?;
        self.snapshot.send_replace(Cart::new());
        info!("Cart cleared");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Persist `cart`, then publish it.
    fn commit(&self, cart: Cart) -> Result<Cart, CartError> {
        let json = serde_json::to_string(&cart)?;
        if let Err(e) = self.storage.set_item(&self.storage_key, &json) {
            error!(error = %e, key = %self.storage_key, "Failed to persist cart");
            return Err(e.into());
        }
        self.snapshot.send_replace(cart.clone());
        Ok(cart)
    }

    /// Turn a failed operation into a notification.
    fn report(&self, operation: CartOperation, error: &CartError) {
        let Some(kind) = NotificationKind::for_error(operation, error) else {
            debug!(%operation, %error, "Ignoring cart request");
            return;
        };

        let notification = Notification::new(operation, kind);
        warn!(
            %operation,
            %error,
            notification = %notification.message,
            "Cart operation failed"
        );

        // No subscribers is fine; the toast is simply not shown.
        let _ = self.notifications.send(notification);
    }
}

/// Read and repair the persisted snapshot.
fn load_snapshot(storage: &impl CartStorage, key: &str) -> Result<Cart, CartError> {
    let Some(json) = storage.get_item(key)? else {
        return Ok(Cart::new());
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(&json) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, key, "Discarding unreadable cart snapshot");
            return Ok(Cart::new());
        }
    };

    // Decoded per entry: an unreadable entry (e.g. a negative amount) is
    // dropped on its own.
    let total = entries.len();
    let items: Vec<CartItem> = entries
        .into_iter()
        .filter_map(|entry| match serde_json::from_value(entry) {
            Ok(item) => Some(item),
            Err(e) => {
                debug!(error = %e, key, "Skipping unreadable cart item");
                None
            }
        })
        .collect();
    let unreadable = total - items.len();

    let (cart, repaired) = Cart::repaired(items);
    let dropped = unreadable + repaired;
    if dropped > 0 {
        warn!(dropped, key, "Dropped duplicate or empty items from cart snapshot");
    }
    Ok(cart)
}
