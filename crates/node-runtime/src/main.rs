//! # Aegis Fabric Node Runtime
//!
//! Reads newline-delimited JSON transactions from stdin and commits them to
//! the in-memory DAG ledger in batches.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (from env)
//! 2. Initialize tracing
//! 3. Build shard ring, ledger, validator and pipeline
//! 4. Spawn the write-behind task
//! 5. Process stdin until EOF or Ctrl-C
//! 6. Audit the ledger, drain write-behind, print the JSON summary

use std::sync::Arc;

use af_04_ingestion_pipeline::TracingRecordSink;
use anyhow::{Context, Result};
use node_runtime::{init_tracing, NodeConfig, NodeRuntime};
use tokio::io::BufReader;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("loading configuration")?;
    init_tracing(&config).context("initializing tracing")?;

    let runtime = NodeRuntime::start(config, Arc::new(TracingRecordSink))?;

    let cancel = runtime.cancellation();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Shutdown signal received, stopping before next commit");
            cancel.cancel();
        }
    });

    let summary = runtime.run(BufReader::new(tokio::io::stdin())).await?;
    let persisted = runtime.shutdown().await?;

    info!(
        "Run complete: {} inserted, {} persisted, {:.0} tps",
        summary.inserted, persisted.persisted, summary.tps
    );
    println!(
        "{}",
        serde_json::to_string(&summary).context("encoding summary")?
    );
    Ok(())
}
