//! # System Lifecycle & Orchestration
//!
//! Individual stages are simple; wiring them together is where the complexity lives.
//! This module is the conductor that starts, connects and stops the pipeline.
//!
//! ## Wiring
//!
//! ```text
//! OrderSource ─▶ [orders] ─▶ InventoryChecker ×N ─▶ [availability] ─▶ InvoiceGenerator
//!                                                                        │
//!                                   sink ◀── Notifier ◀── [invoices] ◀───┘
//! ```
//!
//! Every `[queue]` is bounded by `queue_capacity`. Each stage runs as a pool of
//! [`StageWorker`](stage_framework::StageWorker)s that hold the only clones of their
//! stage's output sender.
//!
//! ## Graceful Shutdown
//!
//! 1. **Stop the source** - cancel its token and await its task
//! 2. **Drop the order client** - the order queue closes once every clone is gone
//! 3. **Drain in pipeline order** - each stage processes what is queued, its workers exit,
//!    and dropping their senders closes the next queue
//! 4. **Collect** - per-worker reports, order count and the final inventory
//!
//! No order that entered the queue is lost. If the drain overruns its deadline,
//! [`FulfillmentSystem::shutdown_within`] cancels every worker instead.

pub mod fulfillment_system;

pub use fulfillment_system::*;
