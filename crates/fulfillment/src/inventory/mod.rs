//! # Inventory
//!
//! The only shared mutable resource in the pipeline.
//!
//! ## Overview
//!
//! [`Inventory`] owns the `item -> count` map exclusively. Callers never see the raw
//! map; the one mutating operation is [`Inventory::try_reserve`], which runs the
//! check-then-decrement as a single critical section:
//!
//! 1. Acquire the lock (optionally bounded by a timeout)
//! 2. Read the item's count
//! 3. If it is positive, decrement it
//! 4. Release the lock
//!
//! No other reader or writer can observe the count between steps 2 and 3, so two
//! concurrent reservations of the last unit can never both succeed.
//!
//! ## Usage
//!
//! ```rust
//! use fulfillment::inventory::{Inventory, InventoryError};
//! use fulfillment::model::ItemId;
//!
//! #[tokio::main]
//! async fn main() {
//!     let inventory = Inventory::from_counts([("bed", 1)]);
//!     let bed = ItemId::from("bed");
//!
//!     assert_eq!(inventory.try_reserve(&bed).await, Ok(0));
//!     assert_eq!(
//!         inventory.try_reserve(&bed).await,
//!         Err(InventoryError::OutOfStock(bed.clone()))
//!     );
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Atomic reservation**: count never goes negative
//! - **Bounded wait**: [`Inventory::with_lock_timeout`] turns a long lock wait into a
//!   retriable [`InventoryError::LockTimeout`]
//! - **Read-only reporting**: [`Inventory::snapshot`] for final reports and tests

pub mod error;

pub use error::*;

use crate::model::ItemId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tracing::trace;

/// Stock counts guarded by a single mutual-exclusion lock.
#[derive(Debug)]
pub struct Inventory {
    stock: Mutex<HashMap<ItemId, u32>>,
    lock_timeout: Option<Duration>,
}

impl Inventory {
    /// Takes ownership of an already-built `item -> count` map.
    pub fn new(initial: HashMap<ItemId, u32>) -> Self {
        Self {
            stock: Mutex::new(initial),
            lock_timeout: None,
        }
    }

    /// Convenience constructor from `(item, count)` pairs.
    pub fn from_counts<I, K>(counts: I) -> Self
    where
        I: IntoIterator<Item = (K, u32)>,
        K: Into<ItemId>,
    {
        Self::new(
            counts
                .into_iter()
                .map(|(item, count)| (item.into(), count))
                .collect(),
        )
    }

    /// Bounds every lock acquisition by `timeout`.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = Some(timeout);
        self
    }

    /// Reserves one unit of `item`, returning the count left afterwards.
    ///
    /// # Errors
    /// - [`InventoryError::UnknownItem`] if the item is not stocked at all
    /// - [`InventoryError::OutOfStock`] if its count is zero; the count is unchanged
    /// - [`InventoryError::LockTimeout`] if a lock timeout is configured and exceeded;
    ///   nothing was read or written
    pub async fn try_reserve(&self, item: &ItemId) -> Result<u32, InventoryError> {
        let mut stock = self.acquire(item).await?;
        let count = stock
            .get_mut(item)
            .ok_or_else(|| InventoryError::UnknownItem(item.clone()))?;
        if *count == 0 {
            return Err(InventoryError::OutOfStock(item.clone()));
        }
        *count -= 1;
        trace!(%item, remaining = *count, "Decremented");
        Ok(*count)
    }

    /// Current count for `item`, or `None` if it is not stocked.
    pub async fn count(&self, item: &ItemId) -> Option<u32> {
        self.stock.lock().await.get(item).copied()
    }

    /// Copy of every count.
    pub async fn snapshot(&self) -> HashMap<ItemId, u32> {
        self.stock.lock().await.clone()
    }

    /// Holds the lock until the guard is dropped, simulating a slow holder.
    #[cfg(test)]
    pub(crate) async fn hold_lock(&self) -> MutexGuard<'_, HashMap<ItemId, u32>> {
        self.stock.lock().await
    }

    async fn acquire(&self, item: &ItemId) -> Result<MutexGuard<'_, HashMap<ItemId, u32>>, InventoryError> {
        match self.lock_timeout {
            None => Ok(self.stock.lock().await),
            Some(waited) => tokio::time::timeout(waited, self.stock.lock())
                .await
                .map_err(|_| InventoryError::LockTimeout {
                    item: item.clone(),
                    waited,
                }),
        }
    }
}
