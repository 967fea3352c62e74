//! Customer-facing sinks for order notifications.

use crate::model::Notification;
use crate::notifier::NotifierError;
use async_trait::async_trait;
use std::io::Write;
use tokio::sync::mpsc;
use tracing::info;

/// Destination for final order notifications.
///
/// Implementations must be shareable: the notifier holds its sink behind an `Arc`.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifierError>;
}

/// Reports notifications as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifierError> {
        let Notification {
            order_id,
            item,
            confirmed,
            message,
        } = notification;
        info!(%order_id, %item, confirmed, "{}", message);
        Ok(())
    }
}

/// Writes one human-readable line per notification to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

#[async_trait]
impl NotificationSink for ConsoleSink {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifierError> {
        write_line(&mut std::io::stdout().lock(), &notification)
    }
}

fn write_line(out: &mut impl Write, notification: &Notification) -> Result<(), NotifierError> {
    writeln!(out, "Notification for the client: {}", notification.message)
        .map_err(|e| NotifierError::Delivery(e.to_string()))
}

/// Forwards notifications to an in-process receiver.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelSink {
    /// Creates the sink and the receiver that observes its notifications.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl NotificationSink for ChannelSink {
    async fn deliver(&self, notification: Notification) -> Result<(), NotifierError> {
        self.sender
            .send(notification)
            .map_err(|_| NotifierError::SinkClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Invoice, InvoiceResult, ItemId, OrderId, RejectionReason};

    fn confirmed() -> Notification {
        Notification::from(InvoiceResult {
            order_id: OrderId(4),
            item: ItemId::from("bed"),
            invoice: Some(Invoice::issue(OrderId(4), ItemId::from("bed"))),
            rejection: None,
        })
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_line_format() {
        let mut out = Vec::new();
        write_line(&mut out, &confirmed()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Notification for the client: Order 4 bed was confirmed (INV-000004)\n"
        );
    }

    #[test]
    fn test_console_write_failure_is_delivery_error() {
        let err = write_line(&mut Broken, &confirmed()).unwrap_err();
        assert!(matches!(err, NotifierError::Delivery(ref msg) if msg.contains("closed")));
    }

    #[tokio::test]
    async fn test_log_and_console_sinks_accept_notifications() {
        let rejected = Notification::from(InvoiceResult {
            order_id: OrderId(5),
            item: ItemId::from("table"),
            invoice: None,
            rejection: Some(RejectionReason::OutOfStock),
        });

        assert_eq!(LogSink.deliver(confirmed()).await, Ok(()));
        assert_eq!(LogSink.deliver(rejected.clone()).await, Ok(()));
        assert_eq!(ConsoleSink.deliver(rejected).await, Ok(()));
    }

    #[tokio::test]
    async fn test_channel_sink_reports_closed_receiver() {
        let (sink, receiver) = ChannelSink::new();
        drop(receiver);
        assert_eq!(sink.deliver(confirmed()).await, Err(NotifierError::SinkClosed));
    }
}
