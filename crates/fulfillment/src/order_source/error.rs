use thiserror::Error;

/// Errors returned when submitting an order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The order queue is closed; the pipeline is shutting down.
    #[error("Pipeline is closed to new orders")]
    PipelineClosed,
}
