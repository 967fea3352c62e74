//! Outcome of the inventory check for one order.
use crate::model::{ItemId, Order, OrderId};
use std::fmt::Display;

/// Why an order could not be reserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// The item is known but its count is zero.
    OutOfStock,
    /// The item is not part of the inventory.
    UnknownItem,
    /// The inventory lock could not be acquired within the configured attempts.
    LockContention,
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RejectionReason::OutOfStock => "out of stock",
            RejectionReason::UnknownItem => "unknown item",
            RejectionReason::LockContention => "inventory busy",
        };
        f.write_str(text)
    }
}

/// Produced once per [`Order`] by the inventory checker.
///
/// `rejection` is `Some` exactly when `available` is `false`; build values through
/// [`AvailabilityResult::reserved`] and [`AvailabilityResult::rejected`] to keep the two
/// fields consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub order_id: OrderId,
    pub item: ItemId,
    pub available: bool,
    pub rejection: Option<RejectionReason>,
}

impl AvailabilityResult {
    pub fn reserved(order: Order) -> Self {
        Self {
            order_id: order.id,
            item: order.item,
            available: true,
            rejection: None,
        }
    }

    pub fn rejected(order: Order, reason: RejectionReason) -> Self {
        Self {
            order_id: order.id,
            item: order.item,
            available: false,
            rejection: Some(reason),
        }
    }
}
