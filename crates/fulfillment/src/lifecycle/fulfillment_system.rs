use crate::clients::OrderClient;
use crate::config::{ConfigError, OrderSourceConfig, PipelineConfig};
use crate::inventory::Inventory;
use crate::inventory_checker::InventoryChecker;
use crate::invoice_generator::InvoiceGenerator;
use crate::model::ItemId;
use crate::notifier::{NotificationSink, Notifier};
use crate::order_source::OrderSource;
use stage_framework::{queue, Stage, StageWorker, WorkerExit, WorkerReport};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

const ORDER_SOURCE: &str = "OrderSource";

#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Stage {0} failed")]
    StageFailed(&'static str),

    /// The drain overran its deadline and workers were cancelled. Orders still queued
    /// at that point were dropped; the report shows what did complete.
    #[error("Pipeline did not drain within {deadline:?}")]
    DrainTimedOut {
        deadline: Duration,
        report: Box<ShutdownReport>,
    },
}

/// What the pipeline did between start and shutdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    /// One entry per worker, in pipeline order.
    pub workers: Vec<WorkerReport>,
    /// Orders accepted onto the order queue.
    pub orders_submitted: u64,
    pub final_inventory: HashMap<ItemId, u32>,
}

impl ShutdownReport {
    /// Inputs successfully processed by every worker of `stage`.
    pub fn processed(&self, stage: &str) -> u64 {
        self.workers
            .iter()
            .filter(|w| w.stage == stage)
            .map(|w| w.processed)
            .sum()
    }

    pub fn failed(&self) -> u64 {
        self.workers.iter().map(|w| w.failed).sum()
    }

    /// `true` when every worker exited because its input closed and emptied.
    pub fn fully_drained(&self) -> bool {
        self.workers.iter().all(|w| w.exit == WorkerExit::Drained)
    }
}

/// The runtime orchestrator for the fulfillment pipeline.
///
/// `FulfillmentSystem` is responsible for:
/// - **Wiring**: one bounded queue between each pair of neighbouring stages
/// - **Lifecycle**: spawning every worker pool and the optional order source
/// - **Shutdown**: the drain protocol described in [`crate::lifecycle`]
///
/// # Example
///
/// ```rust
/// use fulfillment::config::PipelineConfig;
/// use fulfillment::lifecycle::FulfillmentSystem;
/// use fulfillment::notifier::ChannelSink;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let config = PipelineConfig::from_yaml_str("inventory: { bed: 1 }").unwrap();
///     let (sink, mut notifications) = ChannelSink::new();
///     let system = FulfillmentSystem::start(&config, Arc::new(sink)).unwrap();
///
///     system.order_client.submit("bed").await.unwrap();
///     system.order_client.submit("bed").await.unwrap();
///     let report = system.shutdown().await.unwrap();
///
///     assert!(notifications.recv().await.unwrap().confirmed);
///     assert!(!notifications.recv().await.unwrap().confirmed);
///     assert_eq!(report.orders_submitted, 2);
/// }
/// ```
pub struct FulfillmentSystem {
    /// Submission handle for feeding orders directly.
    pub order_client: OrderClient,

    inventory: Arc<Inventory>,
    /// Accepted-orders counter shared with every `OrderClient` clone.
    submitted: Arc<AtomicU64>,
    source_config: OrderSourceConfig,
    catalog: Vec<ItemId>,
    /// Hard stop for every worker and the source.
    cancel: CancellationToken,
    source_shutdown: CancellationToken,
    source: Option<JoinHandle<u64>>,
    /// Worker pools in pipeline order.
    stages: Vec<(&'static str, Vec<JoinHandle<WorkerReport>>)>,
}

impl FulfillmentSystem {
    /// Validates `config`, builds the inventory and starts every stage.
    ///
    /// The order source is not started; call [`start_order_source`](Self::start_order_source)
    /// or feed orders through [`order_client`](Self::order_client).
    pub fn start(
        config: &PipelineConfig,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self, SystemError> {
        config.validate()?;

        let mut inventory = Inventory::from_counts(config.inventory.clone());
        if let Some(timeout) = config.lock_timeout() {
            inventory = inventory.with_lock_timeout(timeout);
        }
        let inventory = Arc::new(inventory);

        let (order_tx, order_rx) = queue("orders", config.queue_capacity);
        let (availability_tx, availability_rx) = queue("availability", config.queue_capacity);
        let (invoice_tx, invoice_rx) = queue("invoices", config.queue_capacity);

        let cancel = CancellationToken::new();

        // =====================================================================
        // Spawn stages back to front so every queue has a consumer first
        // =====================================================================

        let notifier = Arc::new(Notifier::new(sink));
        let notifier_name = notifier.name();
        let notifier_pool = StageWorker::spawn_pool(notifier, 1, invoice_rx, None, cancel.clone());

        let generator = Arc::new(InvoiceGenerator);
        let generator_name = generator.name();
        let generator_pool = StageWorker::spawn_pool(
            generator,
            1,
            availability_rx,
            Some(invoice_tx),
            cancel.clone(),
        );

        let checker = Arc::new(
            InventoryChecker::new(inventory.clone()).with_lock_attempts(config.lock_attempts),
        );
        let checker_name = checker.name();
        let checker_pool = StageWorker::spawn_pool(
            checker,
            config.checker_workers,
            order_rx,
            Some(availability_tx),
            cancel.clone(),
        );

        info!(
            checker_workers = config.checker_workers,
            queue_capacity = config.queue_capacity,
            "Fulfillment system started"
        );

        let order_client = OrderClient::new(order_tx);
        Ok(Self {
            submitted: order_client.counter(),
            order_client,
            inventory,
            source_config: config.order_source.clone(),
            catalog: config.catalog(),
            source_shutdown: cancel.child_token(),
            cancel,
            source: None,
            stages: vec![
                (checker_name, checker_pool),
                (generator_name, generator_pool),
                (notifier_name, notifier_pool),
            ],
        })
    }

    /// Spawns the simulated order source using the configured catalog and pacing.
    pub fn start_order_source(&mut self) {
        if self.source.is_some() {
            warn!("Order source already running");
            return;
        }
        let mut source = OrderSource::new(self.order_client.clone(), self.catalog.clone())
            .with_pacing(self.source_config.pacing())
            .with_max_orders(self.source_config.max_orders);
        if let Some(seed) = self.source_config.seed {
            source = source.with_seed(seed);
        }
        self.source = Some(tokio::spawn(source.run(self.source_shutdown.clone())));
    }

    pub fn inventory(&self) -> &Arc<Inventory> {
        &self.inventory
    }

    /// Stops the source and drains every queued order through the pipeline.
    ///
    /// Waits as long as the drain takes; outstanding [`OrderClient`] clones held by
    /// callers keep the order queue open. See [`shutdown_within`](Self::shutdown_within).
    pub async fn shutdown(self) -> Result<ShutdownReport, SystemError> {
        info!("Shutting down fulfillment system...");

        // =====================================================================
        // Step 1: Stop producing
        // =====================================================================

        self.source_shutdown.cancel();
        if let Some(source) = self.source {
            match source.await {
                Ok(submitted) => info!(submitted, "Order source finished"),
                Err(e) => {
                    error!(error = %e, "Order source task failed");
                    return Err(SystemError::StageFailed(ORDER_SOURCE));
                }
            }
        }

        // =====================================================================
        // Step 2: Close the order queue by dropping our client
        // =====================================================================

        drop(self.order_client);

        // =====================================================================
        // Step 3: Await each stage in pipeline order as it drains
        // =====================================================================

        let mut workers = Vec::new();
        for (stage, handles) in self.stages {
            for handle in handles {
                match handle.await {
                    Ok(report) => workers.push(report),
                    Err(e) => {
                        error!(stage, error = %e, "Worker task failed");
                        return Err(SystemError::StageFailed(stage));
                    }
                }
            }
            info!(stage, "Stage stopped");
        }

        // Clones held elsewhere may have submitted until the order queue closed.
        let orders_submitted = self.submitted.load(Ordering::SeqCst);
        let report = ShutdownReport {
            workers,
            orders_submitted,
            final_inventory: self.inventory.snapshot().await,
        };
        info!(
            orders_submitted,
            fully_drained = report.fully_drained(),
            "System shutdown complete."
        );
        Ok(report)
    }

    /// Like [`shutdown`](Self::shutdown), but cancels every worker once `deadline`
    /// elapses and returns [`SystemError::DrainTimedOut`].
    pub async fn shutdown_within(self, deadline: Duration) -> Result<ShutdownReport, SystemError> {
        let cancel = self.cancel.clone();
        let drain = self.shutdown();
        tokio::pin!(drain);

        match tokio::time::timeout(deadline, &mut drain).await {
            Ok(result) => result,
            Err(_) => {
                warn!(?deadline, "Drain deadline elapsed; cancelling workers");
                cancel.cancel();
                let report = drain.await?;
                Err(SystemError::DrainTimedOut {
                    deadline,
                    report: Box::new(report),
                })
            }
        }
    }
}
