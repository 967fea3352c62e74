//! Pipeline configuration.
//!
//! Loaded from YAML; every key is optional and falls back to its default:
//!
//! ```yaml
//! inventory: { bed: 20, closet: 10, table: 15, armchair: 5 }
//! queue_capacity: 64
//! checker_workers: 1
//! lock_timeout_ms: ~        # unbounded lock wait when absent
//! lock_attempts: 3
//! drain_timeout_ms: 5000
//! run_seconds: 20
//! sink: log                 # log | console
//! order_source:
//!   min_delay_ms: 500
//!   max_delay_ms: 1500
//!   max_orders: ~
//!   seed: ~
//!   items: ~                # defaults to every inventory key
//! ```

use crate::model::ItemId;
use crate::notifier::{ConsoleSink, LogSink, NotificationSink};
use crate::order_source::Pacing;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("queue_capacity must be at least 1")]
    ZeroQueueCapacity,

    #[error("checker_workers must be at least 1")]
    ZeroCheckerWorkers,

    #[error("lock_attempts must be at least 1")]
    ZeroLockAttempts,

    #[error("order_source.min_delay_ms ({min}) exceeds max_delay_ms ({max})")]
    InvalidDelayRange { min: u64, max: u64 },

    #[error("Order source catalog is empty")]
    EmptyCatalog,

    #[error("Catalog item '{0}' is not in the inventory")]
    UnknownItem(ItemId),

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Which notification sink the binary delivers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Structured `tracing` events.
    #[default]
    Log,
    /// One line per notification on stdout.
    Console,
}

impl SinkKind {
    pub fn build(self) -> Arc<dyn NotificationSink> {
        match self {
            SinkKind::Log => Arc::new(LogSink),
            SinkKind::Console => Arc::new(ConsoleSink),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderSourceConfig {
    pub min_delay_ms: u64,
    pub max_delay_ms: u64,
    pub max_orders: Option<u64>,
    pub seed: Option<u64>,
    pub items: Option<Vec<ItemId>>,
}

impl Default for OrderSourceConfig {
    fn default() -> Self {
        Self {
            min_delay_ms: 500,
            max_delay_ms: 1500,
            max_orders: None,
            seed: None,
            items: None,
        }
    }
}

impl OrderSourceConfig {
    pub fn pacing(&self) -> Pacing {
        Pacing::new(
            Duration::from_millis(self.min_delay_ms),
            Duration::from_millis(self.max_delay_ms),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Initial stock. Ordered so the default catalog is stable across runs.
    pub inventory: BTreeMap<ItemId, u32>,
    pub queue_capacity: usize,
    pub checker_workers: usize,
    pub lock_timeout_ms: Option<u64>,
    pub lock_attempts: u32,
    pub drain_timeout_ms: u64,
    pub run_seconds: u64,
    pub sink: SinkKind,
    pub order_source: OrderSourceConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            inventory: [("bed", 20), ("closet", 10), ("table", 15), ("armchair", 5)]
                .into_iter()
                .map(|(item, count)| (ItemId::from(item), count))
                .collect(),
            queue_capacity: 64,
            checker_workers: 1,
            lock_timeout_ms: None,
            lock_attempts: 3,
            drain_timeout_ms: 5000,
            run_seconds: 20,
            sink: SinkKind::Log,
            order_source: OrderSourceConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Items the order source picks from: the configured list, or every inventory key.
    pub fn catalog(&self) -> Vec<ItemId> {
        match &self.order_source.items {
            Some(items) => items.clone(),
            None => self.inventory.keys().cloned().collect(),
        }
    }

    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    pub fn drain_timeout(&self) -> Duration {
        Duration::from_millis(self.drain_timeout_ms)
    }

    pub fn run_duration(&self) -> Duration {
        Duration::from_secs(self.run_seconds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroQueueCapacity);
        }
        if self.checker_workers == 0 {
            return Err(ConfigError::ZeroCheckerWorkers);
        }
        if self.lock_attempts == 0 {
            return Err(ConfigError::ZeroLockAttempts);
        }
        let source = &self.order_source;
        if source.min_delay_ms > source.max_delay_ms {
            return Err(ConfigError::InvalidDelayRange {
                min: source.min_delay_ms,
                max: source.max_delay_ms,
            });
        }
        let catalog = self.catalog();
        if catalog.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if let Some(unknown) = catalog.iter().find(|item| !self.inventory.contains_key(*item)) {
            return Err(ConfigError::UnknownItem(unknown.clone()));
        }
        Ok(())
    }
}
