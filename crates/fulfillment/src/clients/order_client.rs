//! # Order Client
//!
//! Submission handle for the order queue.
//! It wraps a `QueueSender<Order>` and allocates order ids.
use crate::model::{ItemId, Order, OrderId};
use crate::order_source::OrderError;
use stage_framework::QueueSender;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Client for submitting orders into the pipeline.
///
/// Clones share one id counter, so ids stay unique and strictly increasing across every
/// clone. Queue order matches id order as long as one task submits at a time.
///
/// The order queue closes once every clone has been dropped; holding a clone keeps the
/// pipeline from draining.
#[derive(Clone)]
pub struct OrderClient {
    orders: QueueSender<Order>,
    next_id: Arc<AtomicU64>,
    submitted: Arc<AtomicU64>,
}

impl OrderClient {
    pub fn new(orders: QueueSender<Order>) -> Self {
        Self {
            orders,
            next_id: Arc::new(AtomicU64::new(1)),
            submitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates an order for `item` and pushes it onto the order queue.
    ///
    /// Waits for space when the queue is full.
    #[instrument(skip_all)]
    pub async fn submit(&self, item: impl Into<ItemId>) -> Result<OrderId, OrderError> {
        let id = OrderId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let order = Order::new(id, item);
        debug!(?order, "Sending request");
        self.orders
            .send(order)
            .await
            .map_err(|_| OrderError::PipelineClosed)?;
        self.submitted.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    /// Orders accepted onto the queue across every clone.
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::SeqCst)
    }

    /// The shared accepted-orders counter, readable after every clone is gone.
    pub(crate) fn counter(&self) -> Arc<AtomicU64> {
        self.submitted.clone()
    }

    /// Returns `true` once the inventory checker has stopped consuming orders.
    pub fn is_closed(&self) -> bool {
        self.orders.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_framework::mock::drain_queue;
    use stage_framework::queue;

    #[tokio::test]
    async fn test_ids_start_at_one_and_increase() {
        let (tx, rx) = queue("orders", 8);
        let client = OrderClient::new(tx);

        assert_eq!(client.submit("bed").await, Ok(OrderId(1)));
        assert_eq!(client.submit("table").await, Ok(OrderId(2)));
        assert_eq!(client.clone().submit("closet").await, Ok(OrderId(3)));
        assert_eq!(client.submitted(), 3);
        drop(client);

        let orders = drain_queue(&rx).await;
        assert_eq!(
            orders,
            vec![
                Order::new(OrderId(1), "bed"),
                Order::new(OrderId(2), "table"),
                Order::new(OrderId(3), "closet"),
            ]
        );
    }

    #[tokio::test]
    async fn test_submit_after_pipeline_stopped() {
        let (tx, rx) = queue("orders", 8);
        let client = OrderClient::new(tx);
        drop(rx);

        assert!(client.is_closed());
        assert_eq!(client.submit("bed").await, Err(OrderError::PipelineClosed));
        assert_eq!(client.submitted(), 0);
    }
}
