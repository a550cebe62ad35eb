//! Aggregate status derivation
//!
//! A dine-in order's kitchen status is a pure function of its item
//! statuses, so no screen needs its own item-level iteration.

use shared::models::{ItemStatus, OrderItem, OrderStatus};

/// Compute an order's aggregate status from its items
///
/// Rules, in priority order:
/// 1. Empty item list yields `Pending`.
/// 2. All items `Ready` yields `Ready`.
/// 3. At least one `Cooking` and none `Pending` yields `Cooking`.
/// 4. Otherwise `Pending`.
///
/// Never returns `Completed` or `Archive` - those are set only by explicit
/// staff action (print/pay) or by the backend.
pub fn derive_status(items: &[OrderItem]) -> OrderStatus {
    if items.is_empty() {
        return OrderStatus::Pending;
    }

    if items.iter().all(|i| i.status == ItemStatus::Ready) {
        return OrderStatus::Ready;
    }

    let any_cooking = items.iter().any(|i| i.status == ItemStatus::Cooking);
    let any_pending = items.iter().any(|i| i.status == ItemStatus::Pending);

    if any_cooking && !any_pending {
        OrderStatus::Cooking
    } else {
        OrderStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ProductSnapshot;

    fn item(status: ItemStatus) -> OrderItem {
        OrderItem {
            id: Some(1),
            product_id: 1,
            product: ProductSnapshot {
                id: 1,
                name: "Coffee".to_string(),
                price: 2.5,
                image: String::new(),
            },
            count: 1,
            status,
            description: None,
        }
    }

    #[test]
    fn test_empty_items_is_pending() {
        assert_eq!(derive_status(&[]), OrderStatus::Pending);
    }

    #[test]
    fn test_all_ready_is_ready() {
        assert_eq!(derive_status(&[item(ItemStatus::Ready)]), OrderStatus::Ready);
        assert_eq!(
            derive_status(&[item(ItemStatus::Ready), item(ItemStatus::Ready)]),
            OrderStatus::Ready
        );
    }

    #[test]
    fn test_ready_and_cooking_is_cooking() {
        assert_eq!(
            derive_status(&[item(ItemStatus::Ready), item(ItemStatus::Cooking)]),
            OrderStatus::Cooking
        );
    }

    #[test]
    fn test_cooking_and_pending_is_pending() {
        assert_eq!(
            derive_status(&[item(ItemStatus::Cooking), item(ItemStatus::Pending)]),
            OrderStatus::Pending
        );
    }

    #[test]
    fn test_ready_and_pending_is_pending() {
        assert_eq!(
            derive_status(&[item(ItemStatus::Ready), item(ItemStatus::Pending)]),
            OrderStatus::Pending
        );
    }
}
