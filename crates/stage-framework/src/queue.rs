//! # Hand-off Queues
//!
//! This module defines the bounded FIFO channels that connect pipeline stages.
//!
//! A queue is created with [`queue()`], which returns a [`QueueSender`] and a
//! [`QueueReceiver`]. Both halves are cheap to clone:
//!
//! * Cloning the sender lets several producers feed one stage. The queue closes
//!   once **every** sender clone has been dropped.
//! * Cloning the receiver lets several workers service one stage. Each item is
//!   delivered to exactly one of them.
//!
//! ## Close semantics
//!
//! A receive returns `None` only when the queue is closed **and** empty. Items that
//! were queued before the last sender went away are still delivered, so a consumer
//! that loops until `None` drains the queue before it exits.
//!
//! ```rust
//! use stage_framework::queue;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (tx, rx) = queue::<u32>("numbers", 8);
//!     tx.send(1).await.unwrap();
//!     tx.send(2).await.unwrap();
//!     drop(tx);
//!
//!     assert_eq!(rx.recv().await, Some(1));
//!     assert_eq!(rx.recv().await, Some(2));
//!     assert_eq!(rx.recv().await, None);
//! }
//! ```

use crate::error::FrameworkError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// Creates a bounded queue named `name` holding at most `capacity` items.
///
/// # Panics
///
/// Panics if `capacity` is zero, like [`tokio::sync::mpsc::channel`].
pub fn queue<T>(name: &'static str, capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (sender, receiver) = mpsc::channel(capacity);
    (
        QueueSender {
            name,
            inner: sender,
        },
        QueueReceiver {
            name,
            inner: Arc::new(Mutex::new(receiver)),
        },
    )
}

/// Producer half of a queue.
pub struct QueueSender<T> {
    name: &'static str,
    inner: mpsc::Sender<T>,
}

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: self.inner.clone(),
        }
    }
}

impl<T> QueueSender<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Pushes `item`, waiting for space when the queue is full.
    pub async fn send(&self, item: T) -> Result<(), FrameworkError> {
        self.inner
            .send(item)
            .await
            .map_err(|_| FrameworkError::QueueClosed(self.name))
    }

    /// Returns `true` once every receiver has been dropped.
    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Outcome of a receive that races a cancellation token.
#[derive(Debug, PartialEq, Eq)]
pub enum Received<T> {
    Item(T),
    /// Closed and drained.
    Closed,
    Cancelled,
}

/// Consumer half of a queue.
///
/// The underlying receiver sits behind an async mutex so the half can be shared by
/// several workers. Only one worker waits inside `recv` at a time; the others wait
/// for the mutex.
pub struct QueueReceiver<T> {
    name: &'static str,
    inner: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            inner: self.inner.clone(),
        }
    }
}

impl<T> QueueReceiver<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Waits for the next item. `None` means closed and drained.
    pub async fn recv(&self) -> Option<T> {
        self.inner.lock().await.recv().await
    }

    /// Waits for the next item unless `cancel` fires first.
    ///
    /// Cancellation wins ties so a cancelled worker stops promptly even when items
    /// are still queued.
    pub async fn recv_or_cancel(&self, cancel: &CancellationToken) -> Received<T> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Received::Cancelled,
            item = self.recv() => match item {
                Some(item) => Received::Item(item),
                None => Received::Closed,
            },
        }
    }

    /// Waits at most `timeout` for the next item.
    pub async fn recv_timeout(&self, timeout: Duration) -> Result<Option<T>, FrameworkError> {
        tokio::time::timeout(timeout, self.recv())
            .await
            .map_err(|_| FrameworkError::TimedOut(self.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_single_producer_single_consumer() {
        let (tx, rx) = queue::<u32>("fifo", 4);

        let producer = tokio::spawn(async move {
            for i in 0..100 {
                tx.send(i).await.unwrap();
            }
        });

        let mut received = Vec::new();
        while let Some(i) = rx.recv().await {
            received.push(i);
        }
        producer.await.unwrap();

        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_closed_queue_drains_before_reporting_closed() {
        let (tx, rx) = queue::<&str>("drain", 4);
        tx.send("a").await.unwrap();
        tx.send("b").await.unwrap();
        drop(tx);

        let cancel = CancellationToken::new();
        assert_eq!(rx.recv_or_cancel(&cancel).await, Received::Item("a"));
        assert_eq!(rx.recv_or_cancel(&cancel).await, Received::Item("b"));
        assert_eq!(rx.recv_or_cancel(&cancel).await, Received::Closed);
    }

    #[tokio::test]
    async fn test_queue_stays_open_while_a_sender_clone_lives() {
        let (tx, rx) = queue::<u8>("clones", 4);
        let tx2 = tx.clone();
        drop(tx);
        assert_eq!(tx2.name(), "clones");
        assert_eq!(rx.clone().name(), "clones");

        let waited = rx.recv_timeout(Duration::from_millis(20)).await;
        assert!(matches!(waited, Err(FrameworkError::TimedOut("clones"))));

        tx2.send(7).await.unwrap();
        drop(tx2);
        assert_eq!(rx.recv().await, Some(7));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_cancel_wins_over_pending_items() {
        let (tx, rx) = queue::<u8>("cancel", 4);
        tx.send(1).await.unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(rx.recv_or_cancel(&cancel).await, Received::Cancelled);
    }

    #[tokio::test]
    async fn test_send_after_receivers_dropped_reports_closed() {
        let (tx, rx) = queue::<u8>("orphan", 1);
        drop(rx);

        let err = tx.send(1).await.unwrap_err();
        assert!(err.is_closed());
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_shared_receiver_delivers_each_item_once() {
        let (tx, rx) = queue::<u32>("shared", 16);
        let mut workers = Vec::new();
        for _ in 0..4 {
            let rx = rx.clone();
            workers.push(tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(i) = rx.recv().await {
                    seen.push(i);
                }
                seen
            }));
        }
        drop(rx);

        for i in 0..200 {
            tx.send(i).await.unwrap();
        }
        drop(tx);

        let mut all = Vec::new();
        for worker in workers {
            all.extend(worker.await.unwrap());
        }
        all.sort_unstable();
        assert_eq!(all, (0..200).collect::<Vec<_>>());
    }
}
