//! # Generic Stage Worker
//!
//! This module defines the `StageWorker`, the run loop that drives a [`Stage`]. It is the
//! "Server" side of a pipeline stage: it owns one receiver clone of the stage's input
//! queue, an optional sender clone of the output queue, and a cancellation token.
//!
//! ## Loop
//!
//! 1. Wait for the next input, racing the cancellation token.
//! 2. Call [`Stage::process`].
//! 3. Forward the output downstream (terminal stages have no output queue).
//!
//! ## Exit conditions
//!
//! | Condition | [`WorkerExit`] |
//! |-----------|----------------|
//! | Input closed and every queued item processed | `Drained` |
//! | Cancellation token fired | `Cancelled` |
//! | Every downstream receiver dropped | `DownstreamClosed` |
//!
//! A worker drops its output sender when it returns. Once every worker of a stage has
//! returned, the downstream queue closes and the next stage drains in turn. This is what
//! turns "stop the source" into an orderly shutdown of the whole pipeline.
//!
//! A failed `process` call is logged and counted; the worker keeps going.

use crate::error::FrameworkError;
use crate::queue::{QueueReceiver, QueueSender, Received};
use crate::stage::Stage;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    Drained,
    Cancelled,
    DownstreamClosed,
}

/// Summary returned by [`StageWorker::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    pub stage: &'static str,
    pub worker_id: usize,
    /// Inputs for which `process` succeeded.
    pub processed: u64,
    /// Inputs for which `process` returned an error.
    pub failed: u64,
    pub exit: WorkerExit,
}

/// One unit of concurrent execution servicing a stage.
///
/// # Usage Pattern
///
/// ```rust
/// use stage_framework::{queue, Stage, StageWorker, WorkerExit};
/// use async_trait::async_trait;
/// use std::convert::Infallible;
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
///
/// struct Double;
///
/// #[async_trait]
/// impl Stage for Double {
///     type Input = u32;
///     type Output = u32;
///     type Error = Infallible;
///
///     async fn process(&self, input: u32) -> Result<u32, Infallible> {
///         Ok(input * 2)
///     }
/// }
///
/// #[tokio::main]
/// async fn main() {
///     let (in_tx, in_rx) = queue("in", 8);
///     let (out_tx, out_rx) = queue("out", 8);
///
///     let worker = StageWorker::new(Arc::new(Double), in_rx, CancellationToken::new())
///         .with_output(out_tx);
///     let handle = tokio::spawn(worker.run());
///
///     in_tx.send(21).await.unwrap();
///     drop(in_tx);
///
///     assert_eq!(out_rx.recv().await, Some(42));
///     assert_eq!(handle.await.unwrap().exit, WorkerExit::Drained);
/// }
/// ```
pub struct StageWorker<S: Stage> {
    stage: Arc<S>,
    worker_id: usize,
    input: QueueReceiver<S::Input>,
    output: Option<QueueSender<S::Output>>,
    cancel: CancellationToken,
}

impl<S: Stage> StageWorker<S> {
    /// Creates a terminal worker (no output queue) with id `0`.
    pub fn new(stage: Arc<S>, input: QueueReceiver<S::Input>, cancel: CancellationToken) -> Self {
        Self {
            stage,
            worker_id: 0,
            input,
            output: None,
            cancel,
        }
    }

    pub fn with_output(mut self, output: QueueSender<S::Output>) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_worker_id(mut self, worker_id: usize) -> Self {
        self.worker_id = worker_id;
        self
    }

    /// Spawns `workers` workers sharing one stage instance and one input queue.
    ///
    /// The caller's `input` and `output` halves are consumed so that the pool holds the
    /// only clones: the output queue closes when the last worker returns.
    pub fn spawn_pool(
        stage: Arc<S>,
        workers: usize,
        input: QueueReceiver<S::Input>,
        output: Option<QueueSender<S::Output>>,
        cancel: CancellationToken,
    ) -> Vec<JoinHandle<WorkerReport>> {
        (0..workers)
            .map(|worker_id| {
                let mut worker = StageWorker::new(stage.clone(), input.clone(), cancel.clone())
                    .with_worker_id(worker_id);
                if let Some(output) = &output {
                    worker = worker.with_output(output.clone());
                }
                tokio::spawn(worker.run())
            })
            .collect()
    }

    /// Runs the worker loop until the input drains, the token fires, or downstream closes.
    pub async fn run(self) -> WorkerReport {
        let stage = self.stage.name();
        let worker = self.worker_id;
        info!(
            stage,
            worker,
            input = self.input.name(),
            output = self.output.as_ref().map(QueueSender::name),
            "Worker started"
        );

        let mut processed = 0u64;
        let mut failed = 0u64;

        let exit = loop {
            let input = match self.input.recv_or_cancel(&self.cancel).await {
                Received::Item(input) => input,
                Received::Closed => break WorkerExit::Drained,
                Received::Cancelled => break WorkerExit::Cancelled,
            };

            debug!(stage, worker, ?input, "Process");
            let output = match self.stage.process(input).await {
                Ok(output) => output,
                Err(e) => {
                    failed += 1;
                    let error = FrameworkError::StageError(Box::new(e));
                    warn!(stage, worker, %error, "Process failed");
                    continue;
                }
            };
            processed += 1;

            let Some(sender) = &self.output else {
                continue;
            };
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break WorkerExit::Cancelled,
                sent = sender.send(output) => {
                    if let Err(e) = sent {
                        warn!(stage, worker, error = %e, "Downstream closed");
                        break WorkerExit::DownstreamClosed;
                    }
                }
            }
        };

        info!(stage, worker, processed, failed, ?exit, "Worker stopped");
        WorkerReport {
            stage,
            worker_id: worker,
            processed,
            failed,
            exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::queue;
    use async_trait::async_trait;
    use std::convert::Infallible;

    struct Upper;

    #[async_trait]
    impl Stage for Upper {
        type Input = String;
        type Output = String;
        type Error = Infallible;

        async fn process(&self, input: String) -> Result<String, Infallible> {
            Ok(input.to_uppercase())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("odd input: {0}")]
    struct OddInput(u32);

    struct EvenOnly;

    #[async_trait]
    impl Stage for EvenOnly {
        type Input = u32;
        type Output = u32;
        type Error = OddInput;

        async fn process(&self, input: u32) -> Result<u32, OddInput> {
            if input % 2 == 0 {
                Ok(input)
            } else {
                Err(OddInput(input))
            }
        }
    }

    #[tokio::test]
    async fn test_worker_drains_queued_items_before_exiting() {
        let (in_tx, in_rx) = queue("words", 8);
        let (out_tx, out_rx) = queue("upper", 8);

        for word in ["bed", "table", "closet"] {
            in_tx.send(word.to_string()).await.unwrap();
        }
        drop(in_tx);

        let report = StageWorker::new(Arc::new(Upper), in_rx, CancellationToken::new())
            .with_output(out_tx)
            .run()
            .await;

        assert_eq!(report.stage, "Upper");
        assert_eq!(report.processed, 3);
        assert_eq!(report.exit, WorkerExit::Drained);

        assert_eq!(out_rx.recv().await.as_deref(), Some("BED"));
        assert_eq!(out_rx.recv().await.as_deref(), Some("TABLE"));
        assert_eq!(out_rx.recv().await.as_deref(), Some("CLOSET"));
        // The worker dropped its sender, so the output queue is closed.
        assert_eq!(out_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_failed_process_is_counted_and_skipped() {
        let (in_tx, in_rx) = queue("numbers", 8);
        let (out_tx, out_rx) = queue("evens", 8);

        for i in 1..=4 {
            in_tx.send(i).await.unwrap();
        }
        drop(in_tx);

        let report = StageWorker::new(Arc::new(EvenOnly), in_rx, CancellationToken::new())
            .with_output(out_tx)
            .run()
            .await;

        assert_eq!(report.processed, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(out_rx.recv().await, Some(2));
        assert_eq!(out_rx.recv().await, Some(4));
        assert_eq!(out_rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_cancelled_worker_stops_without_draining() {
        let (in_tx, in_rx) = queue("words", 8);
        in_tx.send("left behind".to_string()).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = StageWorker::new(Arc::new(Upper), in_rx.clone(), cancel)
            .run()
            .await;

        assert_eq!(report.exit, WorkerExit::Cancelled);
        assert_eq!(report.processed, 0);
        assert_eq!(in_rx.recv().await.as_deref(), Some("left behind"));
    }

    #[tokio::test]
    async fn test_worker_stops_when_downstream_is_gone() {
        let (in_tx, in_rx) = queue("words", 8);
        let (out_tx, out_rx) = queue::<String>("upper", 8);
        drop(out_rx);

        in_tx.send("bed".to_string()).await.unwrap();

        let report = StageWorker::new(Arc::new(Upper), in_rx, CancellationToken::new())
            .with_output(out_tx)
            .run()
            .await;

        assert_eq!(report.exit, WorkerExit::DownstreamClosed);
        assert_eq!(report.processed, 1);
    }

    #[tokio::test]
    async fn test_pool_closes_output_after_last_worker() {
        let (in_tx, in_rx) = queue("numbers", 32);
        let (out_tx, out_rx) = queue("evens", 32);

        let handles = StageWorker::spawn_pool(
            Arc::new(EvenOnly),
            3,
            in_rx,
            Some(out_tx),
            CancellationToken::new(),
        );

        for i in 0..20u32 {
            in_tx.send(i * 2).await.unwrap();
        }
        drop(in_tx);

        let mut outputs = Vec::new();
        while let Some(i) = out_rx.recv().await {
            outputs.push(i);
        }
        outputs.sort_unstable();
        assert_eq!(outputs, (0..20).map(|i| i * 2).collect::<Vec<_>>());

        let mut total = 0;
        for handle in handles {
            let report = handle.await.unwrap();
            assert_eq!(report.exit, WorkerExit::Drained);
            total += report.processed;
        }
        assert_eq!(total, 20);
    }
}
