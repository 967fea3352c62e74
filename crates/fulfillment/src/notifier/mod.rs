//! # Notifier
//!
//! The terminal stage. Each [`InvoiceResult`](crate::model::InvoiceResult) becomes one
//! [`Notification`](crate::model::Notification) delivered to a [`NotificationSink`]:
//!
//! - [`LogSink`] - structured `tracing` events
//! - [`ConsoleSink`] - one line per order on stdout
//! - [`ChannelSink`] - an in-process receiver, for embedding and tests
//!
//! A sink failure is reported as a [`NotifierError`]; the worker logs it and moves on
//! to the next order.

pub mod error;
pub mod sink;
pub mod stage;

pub use error::*;
pub use sink::*;
pub use stage::*;
