//! Orders and the identifiers they carry.
//!
//! An order is created by the [`OrderClient`](crate::clients::OrderClient), is immutable
//! afterwards, and is consumed exactly once by the
//! [`InventoryChecker`](crate::inventory_checker::InventoryChecker).
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
///
/// Ids start at 1 and strictly increase in allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "order_{}", self.0)
    }
}

/// Type-safe identifier for stocked items (e.g. `"bed"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl From<&str> for ItemId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for ItemId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Represents a customer order entering the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub item: ItemId,
}

impl Order {
    /// Creates a new Order instance.
    ///
    /// # Arguments
    /// * `id` - Unique identifier (allocated by the order client)
    /// * `item` - The item being ordered
    pub fn new(id: OrderId, item: impl Into<ItemId>) -> Self {
        Self {
            id,
            item: item.into(),
        }
    }
}
