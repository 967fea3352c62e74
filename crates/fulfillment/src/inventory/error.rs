//! Error types for the inventory.

use crate::model::ItemId;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while reserving stock.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    /// The item is not part of the inventory.
    #[error("Unknown item: {0}")]
    UnknownItem(ItemId),

    /// The item's count is zero.
    #[error("Out of stock: {0}")]
    OutOfStock(ItemId),

    /// The lock was not acquired within the configured bound. Retriable.
    #[error("Inventory lock not acquired within {waited:?} for {item}")]
    LockTimeout { item: ItemId, waited: Duration },
}

impl InventoryError {
    pub fn is_retriable(&self) -> bool {
        matches!(self, InventoryError::LockTimeout { .. })
    }
}
