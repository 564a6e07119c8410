//! Node configuration from environment variables.

use af_01_dag_ledger::{LedgerConfig, RetentionPolicy};
use af_02_batch_validation::{AcceptancePolicy, BatchValidatorConfig};
use af_03_shard_routing::{RouterConfig, ShardId};
use af_04_ingestion_pipeline::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Default number of shards.
pub const DEFAULT_SHARDS: u16 = 4;

/// Default lines per batch.
pub const DEFAULT_BATCH_SIZE: usize = 1_000;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed.
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        /// Variable name
        key: String,
        /// Raw value
        value: String,
        /// What was expected
        reason: String,
    },
}

/// Full node configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Ledger bounds and retention policy
    pub ledger: LedgerConfig,
    /// Ring configuration
    pub router: RouterConfig,
    /// Shards registered at startup
    pub shards: Vec<ShardId>,
    /// Phase A workers
    pub validator: BatchValidatorConfig,
    /// Admission and routing mode
    pub pipeline: PipelineConfig,
    /// Input lines per batch
    pub batch_size: usize,
    /// Log filter (trace, debug, info, warn, error or an EnvFilter directive)
    pub log_level: String,
    /// Whether to emit JSON logs
    pub json_logs: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            router: RouterConfig::default(),
            shards: (0..DEFAULT_SHARDS).collect(),
            validator: BatchValidatorConfig::default(),
            pipeline: PipelineConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl NodeConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `AF_MAX_RECORDS`: Ledger record bound (default: 1000000)
    /// - `AF_RETENTION_WINDOW_SECS`: Age bound in seconds (default: none)
    /// - `AF_RETENTION_POLICY`: `strict` or `prune` (default: strict)
    /// - `AF_SHARDS`: Shard count, ids 0..n (default: 4)
    /// - `AF_VIRTUAL_NODES`: Virtual nodes per shard (default: 128)
    /// - `AF_WORKERS`: Phase A workers, 0 = all cores (default: 0)
    /// - `AF_ACCEPTANCE`: `partial` or `strict` (default: partial)
    /// - `AF_LOAD_AWARE`: Load-aware routing (default: false)
    /// - `AF_BATCH_SIZE`: Lines per batch (default: 1000)
    /// - `AF_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `AF_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`NodeConfig::from_env`] with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(max) = parse(&lookup, "AF_MAX_RECORDS", "a positive integer")? {
            config.ledger.max_records = max;
        }
        if let Some(window) = parse::<f64>(&lookup, "AF_RETENTION_WINDOW_SECS", "seconds")? {
            config.ledger.retention_window_secs = Some(window);
        }
        if let Some(value) = lookup("AF_RETENTION_POLICY") {
            config.ledger.policy = match value.to_lowercase().as_str() {
                "strict" => RetentionPolicy::Strict,
                "prune" | "prune_ancestors" => RetentionPolicy::PruneAncestors,
                _ => return Err(invalid("AF_RETENTION_POLICY", &value, "strict or prune")),
            };
        }
        if let Some(count) = parse::<u16>(&lookup, "AF_SHARDS", "a shard count")? {
            config.shards = (0..count).collect();
        }
        if let Some(vnodes) = parse(&lookup, "AF_VIRTUAL_NODES", "a positive integer")? {
            config.router.virtual_nodes_per_shard = vnodes;
        }
        if let Some(workers) = parse(&lookup, "AF_WORKERS", "a worker count")? {
            config.validator.workers = workers;
        }
        if let Some(value) = lookup("AF_ACCEPTANCE") {
            config.pipeline.acceptance = match value.to_lowercase().as_str() {
                "partial" => AcceptancePolicy::Partial,
                "strict" => AcceptancePolicy::Strict,
                _ => return Err(invalid("AF_ACCEPTANCE", &value, "partial or strict")),
            };
        }
        if let Some(value) = lookup("AF_LOAD_AWARE") {
            config.pipeline.load_aware = flag(&value);
        }
        if let Some(size) = parse::<usize>(&lookup, "AF_BATCH_SIZE", "a positive integer")? {
            if size == 0 {
                return Err(invalid("AF_BATCH_SIZE", "0", "a positive integer"));
            }
            config.batch_size = size;
        }
        if let Some(level) = lookup("AF_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }
        if let Some(value) = lookup("AF_JSON_LOGS") {
            config.json_logs = flag(&value);
        }

        Ok(config)
    }
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    expected: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| invalid(key, &value, expected)),
    }
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

fn invalid(key: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        reason: format!("expected {expected}"),
    }
}
