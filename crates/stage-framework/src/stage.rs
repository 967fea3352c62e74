//! # Stage Trait
//!
//! The `Stage` trait defines the contract that every pipeline component must implement
//! to be driven by the generic [`StageWorker`](crate::StageWorker). A stage is a single
//! transformation from one input message to one output message; the worker owns the
//! plumbing (receiving, forwarding, logging, shutdown).
//!
//! # Architecture Note
//! By defining a contract (`Stage`) that every component satisfies, the receive loop is
//! written *once* and reused for the inventory checker, the invoice generator and the
//! notifier alike.
//!
//! Associated types keep the wiring honest: a stage whose `Input` is `Order` can only be
//! attached to a queue of `Order`s. The compiler rejects a mis-wired pipeline.
//!
//! # Shared State
//! `process` takes `&self`. A stage serviced by several workers is shared behind an
//! `Arc`, so any mutable state it touches must carry its own synchronization.

use async_trait::async_trait;
use std::fmt::Debug;

/// Trait that any pipeline component must implement to be run by a `StageWorker`.
#[async_trait]
pub trait Stage: Send + Sync + 'static {
    /// The message consumed from the upstream queue.
    type Input: Send + Debug + 'static;

    /// The message emitted to the downstream queue. Terminal stages use `()`.
    type Output: Send + Debug + 'static;

    /// The error type for this stage.
    ///
    /// Stages that resolve every input into an output use
    /// [`std::convert::Infallible`].
    type Error: std::error::Error + Send + Sync + 'static;

    /// Short name used in log fields.
    ///
    /// Defaults to the type name without its module path or generic arguments
    /// (e.g. `"Notifier"`, `"Batch"` for `Batch<Order>`).
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Transform one input into exactly one output.
    async fn process(&self, input: Self::Input) -> Result<Self::Output, Self::Error>;
}
