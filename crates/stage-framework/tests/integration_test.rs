use async_trait::async_trait;
use stage_framework::mock::drain_queue;
use stage_framework::{queue, Stage, StageWorker, WorkerExit};
use std::convert::Infallible;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

// --- Test Stages ---

#[derive(Debug, thiserror::Error)]
#[error("Not a word: {0}")]
struct ParseError(String);

/// Keeps only alphabetic words.
struct Words;

#[async_trait]
impl Stage for Words {
    type Input = String;
    type Output = String;
    type Error = ParseError;

    async fn process(&self, input: String) -> Result<String, ParseError> {
        if input.chars().all(char::is_alphabetic) {
            Ok(input)
        } else {
            Err(ParseError(input))
        }
    }
}

/// Numbers each word. Shared counter, so several workers never reuse a number.
struct Ticket {
    next: AtomicU32,
}

#[async_trait]
impl Stage for Ticket {
    type Input = String;
    type Output = (u32, String);
    type Error = Infallible;

    async fn process(&self, input: String) -> Result<(u32, String), Infallible> {
        Ok((self.next.fetch_add(1, Ordering::SeqCst), input))
    }
}

// --- Tests ---

#[tokio::test]
async fn test_two_stage_chain_drains_in_order() {
    let cancel = CancellationToken::new();
    let (in_tx, in_rx) = queue("raw", 4);
    let (mid_tx, mid_rx) = queue("words", 4);
    let (out_tx, out_rx) = queue("tickets", 4);

    let words = StageWorker::spawn_pool(Arc::new(Words), 1, in_rx, Some(mid_tx), cancel.clone());
    let tickets = StageWorker::spawn_pool(
        Arc::new(Ticket { next: AtomicU32::new(1) }),
        1,
        mid_rx,
        Some(out_tx),
        cancel.clone(),
    );

    for raw in ["bed", "42", "table", "arm chair", "closet"] {
        in_tx.send(raw.to_string()).await.unwrap();
    }
    drop(in_tx);

    let out = drain_queue(&out_rx).await;
    assert_eq!(
        out,
        vec![
            (1, "bed".to_string()),
            (2, "table".to_string()),
            (3, "closet".to_string()),
        ]
    );

    let words_report = words.into_iter().next().unwrap().await.unwrap();
    assert_eq!(words_report.stage, "Words");
    assert_eq!(words_report.processed, 3);
    assert_eq!(words_report.failed, 2);
    assert_eq!(words_report.exit, WorkerExit::Drained);
    for handle in tickets {
        assert_eq!(handle.await.unwrap().exit, WorkerExit::Drained);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_pool_processes_each_input_exactly_once() {
    let (in_tx, in_rx) = queue("raw", 8);
    let (out_tx, out_rx) = queue("tickets", 8);
    let pool = StageWorker::spawn_pool(
        Arc::new(Ticket { next: AtomicU32::new(0) }),
        4,
        in_rx,
        Some(out_tx),
        CancellationToken::new(),
    );

    let producer = tokio::spawn(async move {
        for i in 0..200 {
            in_tx.send(format!("w{i}")).await.unwrap();
        }
    });

    let mut out = drain_queue(&out_rx).await;
    producer.await.unwrap();
    out.sort();

    let tickets: Vec<u32> = out.iter().map(|(n, _)| *n).collect();
    assert_eq!(tickets, (0..200).collect::<Vec<_>>());

    let mut processed = 0;
    for handle in pool {
        let report = handle.await.unwrap();
        assert_eq!(report.exit, WorkerExit::Drained);
        processed += report.processed;
    }
    assert_eq!(processed, 200);
}

#[tokio::test]
async fn test_cancel_stops_idle_chain() {
    let cancel = CancellationToken::new();
    let (_in_tx, in_rx) = queue::<String>("raw", 4);
    let (mid_tx, mid_rx) = queue("words", 4);

    let mut handles = StageWorker::spawn_pool(Arc::new(Words), 2, in_rx, Some(mid_tx), cancel.clone());
    handles.extend(StageWorker::spawn_pool(
        Arc::new(Ticket { next: AtomicU32::new(1) }),
        1,
        mid_rx,
        None,
        cancel.clone(),
    ));

    cancel.cancel();
    for handle in handles {
        let report = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("worker stopped")
            .unwrap();
        assert_eq!(report.exit, WorkerExit::Cancelled);
    }
}
