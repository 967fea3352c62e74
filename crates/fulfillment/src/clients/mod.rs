//! Type-safe handles for feeding the pipeline.

pub mod order_client;

pub use order_client::OrderClient;
