//! # Mock Framework & Testing Guide
//!
//! Testing a pipeline stage in isolation means replacing its neighbours. The
//! [`MockStage<I, O>`] type implements [`Stage`] with scripted responses and records every
//! input it receives, so a real stage can be wired to a fake upstream or downstream.
//!
//! ## When to use Mocks vs Real Stages
//!
//! | Feature | MockStage | Real Stage |
//! |---------|-----------|------------|
//! | **Speed** | Instant (in-memory) | Fast (but may touch shared state) |
//! | **Determinism** | Scripted outputs | Depends on inventory and timing |
//! | **Use Case** | Testing the worker loop or one neighbour | Testing the stage itself or the full pipeline |
//! | **Error Injection** | Easy (`return_err`) | Hard (requires specific state) |
//!
//! ## Testing Strategies
//!
//! <details>
//! <summary><b>Pattern 1: Scripted stage behind a real worker</b></summary>
//!
//! ```rust
//! use stage_framework::mock::{drain_queue, MockStage};
//! use stage_framework::{queue, StageWorker};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = Arc::new(MockStage::<u32, &'static str>::new("Scripted"));
//!     mock.expect_process().return_ok("first");
//!     mock.expect_process().return_err("boom");
//!
//!     let (in_tx, in_rx) = queue("in", 4);
//!     let (out_tx, out_rx) = queue("out", 4);
//!     let worker = StageWorker::new(mock.clone(), in_rx, CancellationToken::new())
//!         .with_output(out_tx);
//!     let handle = tokio::spawn(worker.run());
//!
//!     in_tx.send(1).await.unwrap();
//!     in_tx.send(2).await.unwrap();
//!     drop(in_tx);
//!
//!     assert_eq!(drain_queue(&out_rx).await, vec!["first"]);
//!     assert_eq!(handle.await.unwrap().failed, 1);
//!     assert_eq!(mock.received(), vec![1, 2]);
//!     mock.verify();
//! }
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 2: Real stage with mocked neighbours</b></summary>
//!
//! Feed a real stage from a queue you own and read its output with [`expect_next`].
//! See `tests/stage_isolation_test.rs` in the `fulfillment` crate.
//! </details>
//!
//! <details>
//! <summary><b>Pattern 3: Full pipeline</b></summary>
//!
//! Start the whole system and observe notifications through a channel sink. See
//! `tests/pipeline_test.rs` in the `fulfillment` crate.
//! </details>

use crate::queue::QueueReceiver;
use crate::stage::Stage;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Error returned by a [`MockStage`] scripted with `return_err`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Mock error: {0}")]
pub struct MockError(pub String);

type Script<O> = Arc<Mutex<VecDeque<Result<O, MockError>>>>;

/// A stage whose outputs are scripted in advance.
///
/// Each call to `process` pops the next scripted response. Calling `process` with an
/// empty script panics, so an unexpected input fails the test loudly.
pub struct MockStage<I, O> {
    name: &'static str,
    script: Script<O>,
    received: Arc<Mutex<Vec<I>>>,
}

impl<I, O> MockStage<I, O> {
    /// Creates a mock with no expectations, logged under `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            script: Arc::new(Mutex::new(VecDeque::new())),
            received: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Expects one more `process` call.
    pub fn expect_process(&self) -> ProcessExpectationBuilder<O> {
        ProcessExpectationBuilder {
            script: self.script.clone(),
        }
    }

    /// Inputs seen so far, in arrival order.
    pub fn received(&self) -> Vec<I>
    where
        I: Clone,
    {
        self.received.lock().unwrap().clone()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let script = self.script.lock().unwrap();
        if !script.is_empty() {
            panic!("Not all expectations were met. {} remaining", script.len());
        }
    }
}

#[async_trait]
impl<I, O> Stage for MockStage<I, O>
where
    I: Send + Debug + 'static,
    O: Send + Debug + 'static,
{
    type Input = I;
    type Output = O;
    type Error = MockError;

    fn name(&self) -> &'static str {
        self.name
    }

    async fn process(&self, input: I) -> Result<O, MockError> {
        self.received.lock().unwrap().push(input);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(response) => response,
            None => panic!("Unexpected process call on mock stage {}", self.name),
        }
    }
}

/// Builder for `process` expectations.
pub struct ProcessExpectationBuilder<O> {
    script: Script<O>,
}

impl<O> ProcessExpectationBuilder<O> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, output: O) {
        self.script.lock().unwrap().push_back(Ok(output));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, message: impl Into<String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(MockError(message.into())));
    }
}

// =============================================================================
// QUEUE HELPERS
// =============================================================================

/// Receives until the queue is closed and drained, returning everything seen.
///
/// Only returns once every sender is gone.
pub async fn drain_queue<T>(receiver: &QueueReceiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Some(item) = receiver.recv().await {
        items.push(item);
    }
    items
}

/// Receives the next item, panicking if none arrives within `timeout`.
///
/// Returns `None` if the queue closed instead.
pub async fn expect_next<T>(receiver: &QueueReceiver<T>, timeout: Duration) -> Option<T> {
    match receiver.recv_timeout(timeout).await {
        Ok(item) => item,
        Err(e) => panic!("Expected an item: {}", e),
    }
}
