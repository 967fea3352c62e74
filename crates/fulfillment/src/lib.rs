//! # Fulfillment Pipeline Library
//!
//! A four-stage concurrent order pipeline built on `stage_framework`:
//! orders are checked against a shared inventory, invoiced, and reported to a customer.
//!
//! - **[model]**: Pure data flowing between stages ([`Order`](model::Order) through
//!   [`Notification`](model::Notification)).
//! - **[inventory]**: The only shared mutable state, with atomic reservation.
//! - **[inventory_checker]**, **[invoice_generator]**, **[notifier]**: The three stages.
//! - **[clients]** / **[order_source]**: How orders enter the pipeline.
//! - **[config]**: YAML configuration with validation.
//! - **[lifecycle]**: Starting, wiring and draining the whole system.
//!
//! See `tests/` for end-to-end scenarios and for testing one stage in isolation with
//! [`stage_framework::mock`].

pub mod clients;
pub mod config;
pub mod inventory;
pub mod inventory_checker;
pub mod invoice_generator;
pub mod lifecycle;
pub mod model;
pub mod notifier;
pub mod order_source;
