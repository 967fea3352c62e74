use crate::model::{InvoiceResult, ItemId, OrderId};

/// Customer-facing report of an order's final status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub order_id: OrderId,
    pub item: ItemId,
    pub confirmed: bool,
    pub message: String,
}

impl From<InvoiceResult> for Notification {
    fn from(result: InvoiceResult) -> Self {
        let confirmed = result.invoice.is_some();
        let message = match (&result.invoice, result.rejection) {
            (Some(invoice), _) => format!(
                "Order {} {} was confirmed ({})",
                result.order_id.0, result.item, invoice.number
            ),
            (None, Some(reason)) => format!(
                "Order {} {} was not confirmed: {}",
                result.order_id.0, result.item, reason
            ),
            (None, None) => format!("Order {} {} was not confirmed", result.order_id.0, result.item),
        };
        Self {
            order_id: result.order_id,
            item: result.item,
            confirmed,
            message,
        }
    }
}
