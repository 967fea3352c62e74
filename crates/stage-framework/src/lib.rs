//! # Stage Framework
//!
//! This crate provides the foundational building blocks for concurrent, queue-connected
//! pipelines in Rust. A pipeline is a chain of **stages**; each stage runs as one or more
//! independent Tokio tasks and talks to its neighbours only through bounded FIFO
//! **queues**.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Stage Layer** ([`Stage`]) - Your business logic: one input in, one output out
//! 2. **Runtime Layer** ([`StageWorker`]) - Receive loop, forwarding, logging, shutdown
//! 3. **Transport Layer** ([`queue()`]) - Bounded hand-off channels with close semantics
//!
//! You write the transformation **once** in the stage; the worker handles the async
//! message passing, error accounting and termination.
//!
//! ## Wiring a Pipeline
//!
//! ```rust
//! use stage_framework::{queue, Stage, StageWorker};
//! use async_trait::async_trait;
//! use std::convert::Infallible;
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! struct Parse;
//! struct Square;
//!
//! #[async_trait]
//! impl Stage for Parse {
//!     type Input = String;
//!     type Output = u64;
//!     type Error = std::num::ParseIntError;
//!     async fn process(&self, input: String) -> Result<u64, Self::Error> {
//!         input.parse()
//!     }
//! }
//!
//! #[async_trait]
//! impl Stage for Square {
//!     type Input = u64;
//!     type Output = u64;
//!     type Error = Infallible;
//!     async fn process(&self, input: u64) -> Result<u64, Infallible> {
//!         Ok(input * input)
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let cancel = CancellationToken::new();
//!     let (text_tx, text_rx) = queue("text", 8);
//!     let (num_tx, num_rx) = queue("numbers", 8);
//!     let (out_tx, out_rx) = queue("squares", 8);
//!
//!     tokio::spawn(StageWorker::new(Arc::new(Parse), text_rx, cancel.clone()).with_output(num_tx).run());
//!     tokio::spawn(StageWorker::new(Arc::new(Square), num_rx, cancel.clone()).with_output(out_tx).run());
//!
//!     text_tx.send("12".to_string()).await.unwrap();
//!     text_tx.send("not a number".to_string()).await.unwrap();
//!     text_tx.send("3".to_string()).await.unwrap();
//!     drop(text_tx); // closing the first queue drains the whole chain
//!
//!     assert_eq!(out_rx.recv().await, Some(144));
//!     assert_eq!(out_rx.recv().await, Some(9));
//!     assert_eq!(out_rx.recv().await, None);
//! }
//! ```
//!
//! ## Shutdown
//!
//! - **Graceful**: drop every sender of the first queue. Each stage drains, its workers
//!   exit, and their dropped senders close the next queue.
//! - **Hard**: cancel the [`CancellationToken`](tokio_util::sync::CancellationToken)
//!   shared by the workers. Every blocking receive races that token, so workers stop
//!   promptly and leave queued items behind.
//!
//! ## Concurrency Model
//!
//! - Each worker runs in its own Tokio task
//! - FIFO within a queue; a stage with one worker preserves order end-to-end
//! - Several workers may share one input queue; each item reaches exactly one of them
//! - Stages shared by several workers synchronize their own state
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockStage`](mock::MockStage), a scripted stage, plus
//! queue helpers for asserting on stage output.

pub mod error;
pub mod mock;
pub mod queue;
pub mod stage;
pub mod tracing;
pub mod worker;

// Re-export core types for convenience
pub use error::FrameworkError;
pub use queue::{queue, QueueReceiver, QueueSender, Received};
pub use stage::Stage;
pub use worker::{StageWorker, WorkerExit, WorkerReport};
