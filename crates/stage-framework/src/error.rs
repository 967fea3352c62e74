//! # Framework Errors
//!
//! This module defines the common error types used throughout the stage framework.
//! Queue and worker failures are reported through [`FrameworkError`] so every stage
//! sees the same shutdown and timeout conditions.

/// Errors that can occur within the stage framework itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    /// Every receiver of the named queue is gone; nothing sent will be consumed.
    #[error("Queue closed: {0}")]
    QueueClosed(&'static str),
    /// A bounded receive on the named queue saw no item before its deadline.
    #[error("Timed out waiting on queue: {0}")]
    TimedOut(&'static str),
    #[error("Stage error: {0}")]
    StageError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// Returns `true` for the shutdown-path conditions that are not failures.
    pub fn is_closed(&self) -> bool {
        matches!(self, FrameworkError::QueueClosed(_))
    }
}
