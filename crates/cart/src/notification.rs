//! User-facing notifications (toasts).
//!
//! Every failed cart operation produces at most one [`Notification`]. The
//! message text is chosen by operation and failure kind; error details stay
//! in the logs.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::CartError;

/// Which store operation a notification reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

impl fmt::Display for CartOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
        })
    }
}

/// What went wrong, from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    OutOfStock,
    AddFailed,
    RemoveFailed,
    UpdateFailed,
}

impl NotificationKind {
    /// Toast text shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Error adding product",
            Self::RemoveFailed => "Error removing product",
            Self::UpdateFailed => "Error updating product quantity",
        }
    }

    /// Kind to report for a failed operation, or `None` if the failure is
    /// silent.
    #[must_use]
    pub fn for_error(operation: CartOperation, error: &CartError) -> Option<Self> {
        match (operation, error) {
            (_, CartError::NonPositiveAmount { .. }) => None,
            (CartOperation::Add | CartOperation::Update, CartError::OutOfStock { .. }) => {
                Some(Self::OutOfStock)
            }
            (CartOperation::Add, _) => Some(Self::AddFailed),
            (CartOperation::Remove, _) => Some(Self::RemoveFailed),
            (CartOperation::Update, _) => Some(Self::UpdateFailed),
        }
    }
}

/// An ephemeral message reporting an operation outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Unique id, usable for dismissal.
    pub id: Uuid,
    pub operation: CartOperation,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Create a notification stamped with the current time.
    #[must_use]
    pub fn new(operation: CartOperation, kind: NotificationKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation,
            kind,
            message: kind.message().to_string(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rocketshoes_core::ProductId;

    use super::*;
    use crate::storage::StorageError;

    fn out_of_stock() -> CartError {
        CartError::OutOfStock {
            product_id: ProductId::new(1),
            requested: 3,
            available: 2,
        }
    }

    #[test]
    fn test_out_of_stock_maps_for_add_and_update() {
        assert_eq!(
            NotificationKind::for_error(CartOperation::Add, &out_of_stock()),
            Some(NotificationKind::OutOfStock)
        );
        assert_eq!(
            NotificationKind::for_error(CartOperation::Update, &out_of_stock()),
            Some(NotificationKind::OutOfStock)
        );
    }

    #[test]
    fn test_unexpected_errors_map_to_generic_kind() {
        let err = CartError::Storage(StorageError::Poisoned);
        assert_eq!(
            NotificationKind::for_error(CartOperation::Add, &err),
            Some(NotificationKind::AddFailed)
        );
        assert_eq!(
            NotificationKind::for_error(CartOperation::Remove, &err),
            Some(NotificationKind::RemoveFailed)
        );
        assert_eq!(
            NotificationKind::for_error(CartOperation::Update, &err),
            Some(NotificationKind::UpdateFailed)
        );
    }

    #[test]
    fn test_not_found_on_update_is_update_failure() {
        let err = CartError::NotFound(ProductId::new(4));
        assert_eq!(
            NotificationKind::for_error(CartOperation::Update, &err),
            Some(NotificationKind::UpdateFailed)
        );
    }

    #[test]
    fn test_non_positive_amount_is_silent() {
        let err = CartError::NonPositiveAmount {
            product_id: ProductId::new(1),
            amount: -1,
        };
        assert_eq!(NotificationKind::for_error(CartOperation::Update, &err), None);
    }

    #[test]
    fn test_new_notification_carries_message() {
        let notification = Notification::new(CartOperation::Remove, NotificationKind::RemoveFailed);
        assert_eq!(notification.message, "Error removing product");
        assert_eq!(notification.operation, CartOperation::Remove);
    }

    #[test]
    fn test_notification_serializes_kind_and_operation() {
        let notification = Notification::new(CartOperation::Add, NotificationKind::OutOfStock);

        let json = serde_json::to_value(&notification).unwrap();

        assert_eq!(json["operation"], "add");
        assert_eq!(json["kind"], "out_of_stock");
        assert_eq!(json["message"], "Requested quantity is out of stock");
        assert!(json.get("level").is_none());
    }
}
