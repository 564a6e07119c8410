//! Node runtime: wires the subsystems and drives batches from a line stream.

use crate::config::NodeConfig;
use af_01_dag_ledger::{LedgerReader, SharedLedger, TracingAuditSink};
use af_02_batch_validation::BatchValidator;
use af_03_shard_routing::ShardRouter;
use af_04_ingestion_pipeline::{
    CancellationFlag, IngestionApi, IngestionPipeline, InsertionStatus, PipelineError,
    RecordSink, WriteBehind, WriteBehindStats,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Totals for one run over an input stream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Batches processed
    pub batches: usize,
    /// Input lines read
    pub lines: usize,
    /// Records that passed structural validation
    pub valid: usize,
    /// Records inserted into the ledger
    pub inserted: usize,
    /// Records rejected by validation or the ledger
    pub rejected: usize,
    /// Lines that could not be decoded
    pub decode_failures: usize,
    /// Whether the run stopped on cancellation
    pub cancelled: bool,
    /// Wall-clock seconds
    pub elapsed_secs: f64,
    /// Inserted records per second
    pub tps: f64,
}

/// A running node.
pub struct NodeRuntime {
    config: NodeConfig,
    pipeline: Arc<IngestionPipeline>,
    persistence: JoinHandle<WriteBehindStats>,
    cancel: CancellationFlag,
}

impl NodeRuntime {
    /// Build every subsystem and spawn the write-behind task.
    ///
    /// Must be called inside a tokio runtime.
    pub fn start(config: NodeConfig, sink: Arc<dyn RecordSink>) -> Result<Self> {
        info!("===========================================");
        info!("  Aegis Fabric Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        let router = ShardRouter::with_shards(config.router.clone(), config.shards.iter().copied())
            .context("building shard ring")?;
        let ledger = SharedLedger::new(config.ledger.clone());
        let validator = BatchValidator::new(config.validator.clone());
        let (queue, persistence) = WriteBehind::spawn(sink);

        let pipeline = IngestionPipeline::new(
            config.pipeline.clone(),
            ledger,
            validator,
            Arc::new(router),
        )
        .with_write_behind(queue);

        info!(
            "[runtime] Ledger bound {} records, {:?} retention, {} shards, batch size {}",
            config.ledger.max_records,
            config.ledger.policy,
            config.shards.len(),
            config.batch_size
        );

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
            persistence,
            cancel: CancellationFlag::new(),
        })
    }

    /// Flag that stops the run before the next commit.
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// The assembled pipeline.
    pub fn pipeline(&self) -> &IngestionPipeline {
        &self.pipeline
    }

    /// Read newline-delimited JSON until EOF or cancellation, one batch per
    /// `batch_size` lines.
    pub async fn run<R>(&self, reader: R) -> Result<RunSummary>
    where
        R: AsyncBufRead + Unpin,
    {
        let started = Instant::now();
        let mut summary = RunSummary::default();
        let mut lines = reader.lines();
        let mut batch = Vec::with_capacity(self.config.batch_size);

        while let Some(line) = lines.next_line().await.context("reading input")? {
            summary.lines += 1;
            batch.push(line);
            if batch.len() >= self.config.batch_size
                && !self.process(&mut batch, &mut summary).await?
            {
                break;
            }
        }
        if !batch.is_empty() && !summary.cancelled {
            self.process(&mut batch, &mut summary).await?;
        }

        summary.elapsed_secs = started.elapsed().as_secs_f64();
        if summary.elapsed_secs > 0.0 {
            summary.tps = summary.inserted as f64 / summary.elapsed_secs;
        }
        Ok(summary)
    }

    /// Process one batch on the blocking pool. Returns false once cancelled.
    ///
    /// Validation fans out on rayon and commit waits for the ledger lock, so
    /// the batch never runs on an async worker.
    async fn process(&self, batch: &mut Vec<String>, summary: &mut RunSummary) -> Result<bool> {
        let lines = std::mem::take(batch);
        let pipeline = Arc::clone(&self.pipeline);
        let cancel = self.cancel.clone();
        let (lines, result) = tokio::task::spawn_blocking(move || {
            let result = pipeline.ingest_lines(&lines, &cancel);
            (lines, result)
        })
        .await
        .context("batch task failed")?;

        match result {
            Ok(report) => {
                summary.batches += 1;
                summary.valid += report.structural_pass_count;
                summary.inserted += report.inserted_count();
                summary.rejected += report.count(InsertionStatus::Rejected);
                summary.decode_failures += report.decode_failures.len();
                Ok(true)
            }
            Err(PipelineError::Cancelled) => {
                warn!("[runtime] Cancelled; {} lines left uncommitted", lines.len());
                summary.cancelled = true;
                Ok(false)
            }
            Err(e) => Err(e).context("processing batch"),
        }
    }

    /// Audit the ledger, log its final state and wait for the write-behind
    /// queue to drain.
    pub async fn shutdown(self) -> Result<WriteBehindStats> {
        let ledger = self.pipeline.ledger().clone();
        let tampered = ledger.audit(&TracingAuditSink);
        let stats = ledger.stats();
        let tips = ledger.tips();

        info!(
            "[runtime] Ledger: {} retained, {} tips, {} pruned ancestors, {} evicted, {} tampered",
            stats.retained,
            stats.tips,
            stats.pruned,
            stats.evicted_total,
            tampered
        );
        for tip in tips.iter().take(10) {
            info!("[runtime] Tip {}", tip);
        }

        drop(self.pipeline);
        let persisted = self.persistence.await.context("write-behind task failed")?;
        Ok(persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_04_ingestion_pipeline::MemoryRecordSink;

    fn config(batch_size: usize) -> NodeConfig {
        NodeConfig {
            batch_size,
            ..NodeConfig::default()
        }
    }

    #[tokio::test]
    async fn test_run_batches_lines() {
        let input = "\
{\"sender\":\"alice\",\"receiver\":\"bob\",\"amount\":10,\"timestamp\":1}
{\"sender\":\"carol\",\"receiver\":\"dave\",\"amount\":0,\"timestamp\":2}

{\"sender\":\"erin\",\"receiver\":\"frank\",\"amount\":3,\"timestamp\":3}
";
        let sink = Arc::new(MemoryRecordSink::new());
        let runtime = NodeRuntime::start(config(2), sink.clone()).unwrap();
        let summary = runtime.run(input.as_bytes()).await.unwrap();

        assert_eq!(summary.lines, 4);
        assert_eq!(summary.batches, 2);
        assert_eq!(summary.valid, 2);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.rejected, 1);
        assert!(!summary.cancelled);

        let stats = runtime.shutdown().await.unwrap();
        assert_eq!(stats.persisted, 2);
        assert_eq!(sink.len(), 2);
    }

    #[tokio::test]
    async fn test_cancelled_run_commits_nothing() {
        let runtime =
            NodeRuntime::start(config(10), Arc::new(MemoryRecordSink::new())).unwrap();
        runtime.cancellation().cancel();

        let input = "{\"sender\":\"alice\",\"amount\":1,\"timestamp\":1}\n";
        let summary = runtime.run(input.as_bytes()).await.unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.inserted, 0);
        assert!(runtime.pipeline().ledger().is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_other_tasks_progress_while_batches_run() {
        use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

        let runtime =
            NodeRuntime::start(config(20), Arc::new(MemoryRecordSink::new())).unwrap();
        let ticks = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));
        let ticker = {
            let ticks = Arc::clone(&ticks);
            let stop = Arc::clone(&stop);
            tokio::spawn(async move {
                while !stop.load(Ordering::SeqCst) {
                    ticks.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                }
            })
        };

        let input: String = (0..1_000)
            .map(|i| format!("{{\"sender\":\"s{i}\",\"amount\":1,\"timestamp\":{}}}\n", i + 1))
            .collect();
        let summary = runtime.run(input.as_bytes()).await.unwrap();
        let observed = ticks.load(Ordering::SeqCst);
        stop.store(true, Ordering::SeqCst);
        ticker.await.unwrap();

        assert_eq!(summary.batches, 50);
        assert!(observed > 0);
    }
}
