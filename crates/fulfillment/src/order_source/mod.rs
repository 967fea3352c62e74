//! # Order Source
//!
//! Simulated customer traffic. Picks a random catalog item, submits it through an
//! [`OrderClient`], then sleeps for a random pacing delay.
//!
//! The loop ends when any of these happens:
//! - its shutdown token is cancelled (also while sleeping or waiting for queue space)
//! - the order queue is closed
//! - `max_orders` orders have been submitted

pub mod error;

pub use error::*;

use crate::clients::OrderClient;
use crate::model::ItemId;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Uniform pacing bounds between two orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// No delay between orders.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    fn sample(&self, rng: &mut fastrand::Rng) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = (self.max.as_millis() as u64).max(min);
        Duration::from_millis(rng.u64(min..=max))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(Duration::from_millis(500), Duration::from_millis(1500))
    }
}

pub struct OrderSource {
    client: OrderClient,
    catalog: Vec<ItemId>,
    pacing: Pacing,
    max_orders: Option<u64>,
    rng: fastrand::Rng,
}

impl OrderSource {
    /// Creates a source drawing from `catalog`, which must not be empty.
    pub fn new(client: OrderClient, catalog: Vec<ItemId>) -> Self {
        Self {
            client,
            catalog,
            pacing: Pacing::default(),
            max_orders: None,
            rng: fastrand::Rng::new(),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_max_orders(mut self, max_orders: Option<u64>) -> Self {
        self.max_orders = max_orders;
        self
    }

    /// Makes item choice and pacing reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = fastrand::Rng::with_seed(seed);
        self
    }

    /// Produces orders until stopped and returns how many were submitted.
    pub async fn run(mut self, shutdown: CancellationToken) -> u64 {
        let mut submitted = 0;
        if self.catalog.is_empty() {
            warn!("Order source has an empty catalog; not producing");
            return submitted;
        }
        info!(catalog = self.catalog.len(), "Order source started");

        loop {
            if self.max_orders.is_some_and(|max| submitted >= max) {
                info!(submitted, "Order limit reached");
                break;
            }
            if shutdown.is_cancelled() {
                break;
            }

            let item = self.catalog[self.rng.usize(..self.catalog.len())].clone();
            // A full queue must not keep the source alive past cancellation.
            let result = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                result = self.client.submit(item.clone()) => result,
            };
            match result {
                Ok(order_id) => {
                    submitted += 1;
                    info!(%order_id, %item, "Order placed");
                }
                Err(OrderError::PipelineClosed) => {
                    warn!("Order queue closed; stopping order source");
                    break;
                }
            }

            let delay = self.pacing.sample(&mut self.rng);
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        info!(submitted, "Order source stopped");
        submitted
    }
}
