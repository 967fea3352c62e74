use crate::model::{AvailabilityResult, Invoice, InvoiceResult};
use async_trait::async_trait;
use stage_framework::Stage;
use std::convert::Infallible;
use tracing::info;

/// Turns an availability result into an invoice result.
///
/// An invoice is issued iff the order was reserved; the rejection reason of an
/// unavailable order is carried through unchanged.
pub fn generate_invoice(result: AvailabilityResult) -> InvoiceResult {
    let invoice = result
        .available
        .then(|| Invoice::issue(result.order_id, result.item.clone()));
    InvoiceResult {
        order_id: result.order_id,
        item: result.item,
        invoice,
        rejection: result.rejection,
    }
}

/// Stage wrapper around [`generate_invoice`]. Holds no state.
#[derive(Debug, Default, Clone, Copy)]
pub struct InvoiceGenerator;

#[async_trait]
impl Stage for InvoiceGenerator {
    type Input = AvailabilityResult;
    type Output = InvoiceResult;
    type Error = Infallible;

    async fn process(&self, result: AvailabilityResult) -> Result<InvoiceResult, Infallible> {
        let invoiced = generate_invoice(result);
        if let Some(invoice) = &invoiced.invoice {
            info!(order_id = %invoiced.order_id, %invoice, "Invoice created");
        }
        Ok(invoiced)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Order, OrderId, RejectionReason};

    #[test]
    fn test_available_order_gets_invoice() {
        let result = AvailabilityResult::reserved(Order::new(OrderId(12), "closet"));

        let invoiced = generate_invoice(result);

        let invoice = invoiced.invoice.expect("reserved order must be invoiced");
        assert_eq!(invoice.order_id, OrderId(12));
        assert_eq!(invoice.number, "INV-000012");
        assert_eq!(invoice.to_string(), "Invoice of order 12: closet");
        assert_eq!(invoiced.rejection, None);
    }

    #[test]
    fn test_unavailable_order_gets_no_invoice() {
        let result = AvailabilityResult::rejected(
            Order::new(OrderId(3), "table"),
            RejectionReason::OutOfStock,
        );

        let invoiced = generate_invoice(result);

        assert_eq!(invoiced.order_id, OrderId(3));
        assert!(invoiced.invoice.is_none());
        assert_eq!(invoiced.rejection, Some(RejectionReason::OutOfStock));
    }

    #[tokio::test]
    async fn test_stage_preserves_correlation() {
        let generator = InvoiceGenerator;
        for id in 1..=5u64 {
            let order = Order::new(OrderId(id), "bed");
            let input = if id % 2 == 0 {
                AvailabilityResult::reserved(order)
            } else {
                AvailabilityResult::rejected(order, RejectionReason::OutOfStock)
            };
            let output = generator.process(input).await.unwrap();
            assert_eq!(output.order_id, OrderId(id));
            assert_eq!(output.invoice.is_some(), id % 2 == 0);
        }
    }
}
