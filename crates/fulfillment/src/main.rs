//! # Fulfillment
//!
//! Runs the order pipeline against simulated traffic for a fixed time, then drains it.
//!
//! ```bash
//! RUST_LOG=info cargo run -p fulfillment -- --run-seconds 5 --seed 1
//! RUST_LOG=debug cargo run -p fulfillment -- --config pipeline.yaml --sink console
//! ```

use clap::Parser;
use fulfillment::config::{PipelineConfig, SinkKind};
use fulfillment::lifecycle::{FulfillmentSystem, SystemError};
use stage_framework::tracing::setup_tracing;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "fulfillment")]
#[command(author, version, about = "Concurrent order fulfillment pipeline", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "FULFILLMENT_CONFIG")]
    config: Option<PathBuf>,

    /// How long the order source runs
    #[arg(long)]
    run_seconds: Option<u64>,

    /// Inventory checker workers sharing the order queue
    #[arg(long)]
    checker_workers: Option<usize>,

    /// Seed for reproducible item choice and pacing
    #[arg(long)]
    seed: Option<u64>,

    /// Stop the source after this many orders
    #[arg(long)]
    max_orders: Option<u64>,

    /// Where notifications are delivered
    #[arg(long, value_enum)]
    sink: Option<SinkKind>,
}

impl Cli {
    fn into_config(self) -> Result<PipelineConfig, String> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path).map_err(|e| e.to_string())?,
            None => PipelineConfig::default(),
        };
        if let Some(run_seconds) = self.run_seconds {
            config.run_seconds = run_seconds;
        }
        if let Some(workers) = self.checker_workers {
            config.checker_workers = workers;
        }
        if let Some(seed) = self.seed {
            config.order_source.seed = Some(seed);
        }
        if let Some(max_orders) = self.max_orders {
            config.order_source.max_orders = Some(max_orders);
        }
        if let Some(sink) = self.sink {
            config.sink = sink;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = Cli::parse().into_config()?;
    info!(run_seconds = config.run_seconds, sink = ?config.sink, "Starting fulfillment pipeline");

    let mut system =
        FulfillmentSystem::start(&config, config.sink.build()).map_err(|e| e.to_string())?;
    system.start_order_source();

    tokio::select! {
        _ = tokio::time::sleep(config.run_duration()) => info!("Run time elapsed"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    let report = match system.shutdown_within(config.drain_timeout()).await {
        Ok(report) => report,
        Err(SystemError::DrainTimedOut { deadline, report }) => {
            warn!(?deadline, "Pipeline cancelled before fully draining");
            *report
        }
        Err(e) => return Err(e.to_string()),
    };

    for worker in &report.workers {
        info!(
            stage = worker.stage,
            worker = worker.worker_id,
            processed = worker.processed,
            failed = worker.failed,
            exit = ?worker.exit,
            "Worker report"
        );
    }
    let mut remaining: Vec<_> = report.final_inventory.iter().collect();
    remaining.sort();
    for (item, count) in remaining {
        info!(%item, count, "Final stock");
    }

    info!(orders = report.orders_submitted, "Application completed successfully");
    Ok(())
}
