use crate::model::{ItemId, OrderId, RejectionReason};
use std::fmt::Display;

/// Invoice issued for a reserved order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub number: String,
    pub order_id: OrderId,
    pub item: ItemId,
}

impl Invoice {
    /// Issues the invoice for `order_id`. The number is derived from the order id, so
    /// every order gets at most one distinct invoice number.
    pub fn issue(order_id: OrderId, item: ItemId) -> Self {
        Self {
            number: format!("INV-{:06}", order_id.0),
            order_id,
            item,
        }
    }
}

impl Display for Invoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invoice of order {}: {}", self.order_id.0, self.item)
    }
}

/// Produced once per availability result by the invoice generator.
///
/// `invoice` is present iff the order was reserved; otherwise `rejection` carries the
/// reason through to the notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceResult {
    pub order_id: OrderId,
    pub item: ItemId,
    pub invoice: Option<Invoice>,
    pub rejection: Option<RejectionReason>,
}
