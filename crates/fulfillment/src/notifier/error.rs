//! Error types for the notifier.

use thiserror::Error;

/// Errors raised while handing a notification to its sink.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifierError {
    /// The receiving side of the sink is gone.
    #[error("Notification sink closed")]
    SinkClosed,

    /// The sink accepted the notification but failed to deliver it.
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}
