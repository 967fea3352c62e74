//! Stage trait implementation for the inventory checker.

use crate::inventory::{Inventory, InventoryError};
use crate::model::{AvailabilityResult, Order, RejectionReason};
use async_trait::async_trait;
use stage_framework::Stage;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reserves stock for each order and reports whether it was available.
///
/// Every order yields exactly one [`AvailabilityResult`]; data errors and lock
/// contention resolve to a rejection instead of failing the stage.
pub struct InventoryChecker {
    inventory: Arc<Inventory>,
    lock_attempts: u32,
}

impl InventoryChecker {
    pub fn new(inventory: Arc<Inventory>) -> Self {
        Self {
            inventory,
            lock_attempts: 1,
        }
    }

    /// How many times a lock timeout is retried before the order is rejected.
    /// Values below one are treated as one.
    pub fn with_lock_attempts(mut self, attempts: u32) -> Self {
        self.lock_attempts = attempts.max(1);
        self
    }

    /// Atomically reserves the order's item if it is in stock.
    pub async fn check_and_reserve(&self, order: Order) -> AvailabilityResult {
        let order_id = order.id;
        let mut attempt = 1;
        loop {
            match self.inventory.try_reserve(&order.item).await {
                Ok(remaining) => {
                    info!(%order_id, item = %order.item, remaining, "Reserved");
                    return AvailabilityResult::reserved(order);
                }
                Err(InventoryError::OutOfStock(_)) => {
                    info!(%order_id, item = %order.item, "Out of stock");
                    return AvailabilityResult::rejected(order, RejectionReason::OutOfStock);
                }
                Err(InventoryError::UnknownItem(_)) => {
                    warn!(%order_id, item = %order.item, "Unknown item; rejecting");
                    return AvailabilityResult::rejected(order, RejectionReason::UnknownItem);
                }
                Err(e @ InventoryError::LockTimeout { .. }) => {
                    if attempt >= self.lock_attempts {
                        warn!(%order_id, attempts = attempt, error = %e, "Giving up on inventory lock");
                        return AvailabilityResult::rejected(order, RejectionReason::LockContention);
                    }
                    debug!(%order_id, attempt, error = %e, "Retrying");
                    attempt += 1;
                }
            }
        }
    }
}

#[async_trait]
impl Stage for InventoryChecker {
    type Input = Order;
    type Output = AvailabilityResult;
    type Error = Infallible;

    async fn process(&self, order: Order) -> Result<AvailabilityResult, Infallible> {
        info!(order_id = %order.id, item = %order.item, "Order received");
        Ok(self.check_and_reserve(order).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ItemId, OrderId};
    use std::time::Duration;

    fn order(id: u64, item: &str) -> Order {
        Order::new(OrderId(id), item)
    }

    #[tokio::test]
    async fn test_available_item_is_reserved() {
        let inventory = Arc::new(Inventory::from_counts([("bed", 2)]));
        let checker = InventoryChecker::new(inventory.clone());

        let result = checker.process(order(1, "bed")).await.unwrap();

        assert_eq!(result.order_id, OrderId(1));
        assert!(result.available);
        assert_eq!(result.rejection, None);
        assert_eq!(inventory.count(&ItemId::from("bed")).await, Some(1));
    }

    #[tokio::test]
    async fn test_empty_item_is_rejected_without_change() {
        let inventory = Arc::new(Inventory::from_counts([("table", 0)]));
        let checker = InventoryChecker::new(inventory.clone());

        let result = checker.check_and_reserve(order(7, "table")).await;

        assert!(!result.available);
        assert_eq!(result.rejection, Some(RejectionReason::OutOfStock));
        assert_eq!(inventory.count(&ItemId::from("table")).await, Some(0));
    }

    #[tokio::test]
    async fn test_unknown_item_is_rejected() {
        let inventory = Arc::new(Inventory::from_counts([("bed", 1)]));
        let checker = InventoryChecker::new(inventory.clone());

        let result = checker.check_and_reserve(order(2, "hammock")).await;

        assert!(!result.available);
        assert_eq!(result.rejection, Some(RejectionReason::UnknownItem));
        assert_eq!(inventory.count(&ItemId::from("bed")).await, Some(1));
    }

    #[tokio::test]
    async fn test_lock_contention_is_retried_then_rejected() {
        let inventory = Arc::new(
            Inventory::from_counts([("closet", 1)]).with_lock_timeout(Duration::from_millis(5)),
        );
        let checker = InventoryChecker::new(inventory.clone()).with_lock_attempts(3);

        let held = inventory.hold_lock().await;
        let result = checker.check_and_reserve(order(3, "closet")).await;
        drop(held);

        assert_eq!(result.rejection, Some(RejectionReason::LockContention));
        assert_eq!(inventory.count(&ItemId::from("closet")).await, Some(1));
    }

    #[tokio::test]
    async fn test_lock_released_before_attempts_run_out() {
        let inventory = Arc::new(
            Inventory::from_counts([("closet", 1)]).with_lock_timeout(Duration::from_millis(20)),
        );
        let checker = InventoryChecker::new(inventory.clone()).with_lock_attempts(50);

        let holder = inventory.clone();
        let release = tokio::spawn(async move {
            let held = holder.hold_lock().await;
            tokio::time::sleep(Duration::from_millis(60)).await;
            drop(held);
        });
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = checker.check_and_reserve(order(4, "closet")).await;
        release.await.unwrap();

        assert!(result.available);
        assert_eq!(inventory.count(&ItemId::from("closet")).await, Some(0));
    }
}
