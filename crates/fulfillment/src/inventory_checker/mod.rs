//! # Inventory Checker
//!
//! The first stage after the order queue: reserves stock for each order.
//!
//! ## Overview
//!
//! For every [`Order`](crate::model::Order) received, the checker calls
//! [`Inventory::try_reserve`](crate::inventory::Inventory::try_reserve) and emits one
//! [`AvailabilityResult`](crate::model::AvailabilityResult):
//!
//! | Inventory outcome | `available` | `rejection` |
//! |-------------------|-------------|-------------|
//! | Reserved | `true` | `None` |
//! | Out of stock | `false` | `OutOfStock` |
//! | Unknown item | `false` | `UnknownItem` |
//! | Lock timeout, attempts exhausted | `false` | `LockContention` |
//!
//! ## Structure
//!
//! - [`stage`] - [`Stage`](stage_framework::Stage) implementation for [`InventoryChecker`]
//!
//! ## Workers
//!
//! The checker is the only stage that touches shared state, and it is safe to run as
//! several workers on one order queue: all of them share one `Arc<Inventory>` and its
//! lock. With more than one worker, orders may leave the stage in a different order than
//! they were submitted.
//!
//! ## Usage
//!
//! ```rust
//! use fulfillment::inventory::Inventory;
//! use fulfillment::inventory_checker::InventoryChecker;
//! use fulfillment::model::{Order, OrderId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let inventory = Arc::new(Inventory::from_counts([("bed", 1)]));
//!     let checker = InventoryChecker::new(inventory);
//!
//!     let first = checker.check_and_reserve(Order::new(OrderId(1), "bed")).await;
//!     let second = checker.check_and_reserve(Order::new(OrderId(2), "bed")).await;
//!     assert!(first.available);
//!     assert!(!second.available);
//! }
//! ```

pub mod stage;

pub use stage::*;
