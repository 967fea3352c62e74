//! # Invoice Generator
//!
//! Pure, stateless stage between the inventory checker and the notifier.
//!
//! - [`generate_invoice`] - the transform itself
//! - [`InvoiceGenerator`] - its [`Stage`](stage_framework::Stage) wrapper

pub mod stage;

pub use stage::*;
