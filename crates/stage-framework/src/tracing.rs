//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the `tracing-subscriber` used by binaries built on the
//! framework.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`); every framework event carries a `stage` field instead.
//! The filter comes from `RUST_LOG` and falls back to `info`.
//!
//! ```bash
//! # Lifecycle and per-order decisions
//! RUST_LOG=info cargo run
//!
//! # Every message entering a stage
//! RUST_LOG=debug cargo run
//!
//! # Only the framework's worker loop
//! RUST_LOG=stage_framework=debug cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Worker lifecycle**: `Worker started` / `Worker stopped` with the exit reason
//! - **Messages**: `Process input=...` at `debug`
//! - **Failures**: `Process failed` and `Downstream closed` at `warn`
//!
//! ## Workflow Trace Example
//!
//! ```text
//! INFO Worker started stage="InventoryChecker" worker=0
//! INFO Order received order_id=order_1 item=bed
//! INFO Reserved order_id=order_1 item=bed remaining=19
//! INFO Invoice created order_id=order_1 invoice=Invoice of order 1: bed
//! INFO Order confirmed order_id=order_1 item=bed
//! INFO Worker stopped stage="InventoryChecker" worker=0 processed=1 failed=0 exit=Drained
//! ```
use tracing_subscriber::EnvFilter;

/// Initializes the global subscriber. Call once per process.
pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // Stage name is carried as a field
        .compact()
        .init();
}
