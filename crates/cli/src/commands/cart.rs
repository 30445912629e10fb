//! Cart commands.
//!
//! Mutating commands go through the notifying store operations, so the CLI
//! sees exactly the toasts a UI would. Any notification raised while the
//! command runs is logged and turns into a non-zero exit.

use rocketshoes_cart::{Notification, UpdateProductAmount};
use rocketshoes_core::{Cart, ProductId};
use tokio::sync::broadcast;
use tracing::{error, info};

use super::{CliError, Store};

/// Log the cart contents.
pub fn show(store: &Store) -> Result<(), CliError> {
    for line in render(&store.cart()) {
        info!("{line}");
    }
    Ok(())
}

/// Add one unit of a product.
pub async fn add(store: &Store, product_id: ProductId) -> Result<(), CliError> {
    let mut toasts = store.notifications();
    store.add_product(product_id).await;
    finish(store, &mut toasts)
}

/// Remove a product.
pub async fn remove(store: &Store, product_id: ProductId) -> Result<(), CliError> {
    let mut toasts = store.notifications();
    store.remove_product(product_id).await;
    finish(store, &mut toasts)
}

/// Set the quantity of a product.
pub async fn update(store: &Store, product_id: ProductId, amount: i64) -> Result<(), CliError> {
    let mut toasts = store.notifications();
    store
        .update_product_amount(UpdateProductAmount { product_id, amount })
        .await;
    finish(store, &mut toasts)
}

/// Delete the persisted cart.
pub async fn clear(store: &Store) -> Result<(), CliError> {
    store.clear().await?;
    info!("Cart cleared");
    Ok(())
}

/// Report notifications raised by the command, then show the cart.
fn finish(store: &Store, toasts: &mut broadcast::Receiver<Notification>) -> Result<(), CliError> {
    let raised = drain(toasts);
    for toast in &raised {
        error!(operation = %toast.operation, "{}", toast.message);
    }

    show(store)?;

    if raised.is_empty() {
        Ok(())
    } else {
        Err(CliError::Rejected(raised.len()))
    }
}

/// Collect every notification already queued on the receiver.
fn drain(toasts: &mut broadcast::Receiver<Notification>) -> Vec<Notification> {
    let mut raised = Vec::new();
    loop {
        match toasts.try_recv() {
            Ok(toast) => raised.push(toast),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                error!(skipped, "Notifications were dropped");
            }
            Err(_) => return raised,
        }
    }
}

/// Human-readable cart summary, one line per entry plus a total.
fn render(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines = Vec::with_capacity(cart.len() + 1);
    for item in cart {
        lines.push(format!(
            "#{:<4} {:<40} {:>3} x {:>10} = {:>10}",
            item.id.as_i32(),
            item.name,
            item.amount,
            item.price.to_string(),
            item.subtotal().to_string()
        ));
    }
    lines.push(format!(
        "{} product(s), {} unit(s), total {}",
        cart.len(),
        cart.total_quantity(),
        cart.total()
    ));
    lines
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rocketshoes_cart::{CartOperation, NotificationKind};
    use rocketshoes_core::{CartItem, Price};

    use super::*;

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&Cart::new()), vec!["Cart is empty".to_string()]);
    }

    #[test]
    fn test_render_lines_and_total() {
        let (cart, _) = Cart::repaired(vec![
            CartItem {
                id: ProductId::new(1),
                name: "Tênis de Caminhada Leve Confortável".to_string(),
                price: Price::from_cents(17_990),
                image: String::new(),
                amount: 2,
            },
            CartItem {
                id: ProductId::new(2),
                name: "Tênis VR Caminhada Confortável".to_string(),
                price: Price::from_cents(13_990),
                image: String::new(),
                amount: 1,
            },
        ]);

        let lines = render(&cart);

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("#1"));
        assert!(lines[0].contains("$179.90"));
        assert!(lines[0].ends_with("$359.80"));
        assert_eq!(lines[2], "2 product(s), 3 unit(s), total $499.70");
    }

    #[test]
    fn test_drain_collects_queued_notifications() {
        let (tx, mut rx) = broadcast::channel(4);
        tx.send(Notification::new(CartOperation::Add, NotificationKind::OutOfStock))
            .unwrap();
        tx.send(Notification::new(CartOperation::Add, NotificationKind::AddFailed))
            .unwrap();

        let raised = drain(&mut rx);

        assert_eq!(raised.len(), 2);
        assert_eq!(raised[0].kind, NotificationKind::OutOfStock);
        assert!(drain(&mut rx).is_empty());
    }
}
