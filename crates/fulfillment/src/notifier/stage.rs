use crate::model::{InvoiceResult, Notification};
use crate::notifier::{NotificationSink, NotifierError};
use async_trait::async_trait;
use stage_framework::Stage;
use std::sync::Arc;
use tracing::debug;

/// Terminal stage: reports each order's final status to a sink.
pub struct Notifier {
    sink: Arc<dyn NotificationSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Reports confirmation (invoice present) or rejection (invoice absent).
    pub async fn notify(&self, result: InvoiceResult) -> Result<(), NotifierError> {
        let notification = Notification::from(result);
        debug!(order_id = %notification.order_id, confirmed = notification.confirmed, "Delivering");
        self.sink.deliver(notification).await
    }
}

#[async_trait]
impl Stage for Notifier {
    type Input = InvoiceResult;
    type Output = ();
    type Error = NotifierError;

    async fn process(&self, result: InvoiceResult) -> Result<(), NotifierError> {
        self.notify(result).await
    }
}
