//! # Concurrency Tests
//!
//! Batches, readers and ring updates running at the same time.
//!
//! - Batches are serialized end-to-end by the ledger's upgradable guard.
//! - Readers never see a half-committed batch's broken references.
//! - Routing never observes a half-built ring.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    use af_01_dag_ledger::{
        invariant_referential_integrity, invariant_tips_consistent, LedgerConfig, LedgerReader,
        SharedLedger,
    };
    use af_02_batch_validation::{BatchValidator, BatchValidatorConfig};
    use af_03_shard_routing::{RouterConfig, ShardRouter, ShardRoutingApi};
    use af_04_ingestion_pipeline::{
        CancellationFlag, IngestionApi, IngestionPipeline, PipelineConfig,
    };
    use rayon::prelude::*;
    use shared_types::TransactionRecord;

    fn shared_pipeline(max_records: usize) -> Arc<IngestionPipeline> {
        let router = ShardRouter::with_shards(RouterConfig::for_testing(), 0..4).unwrap();
        Arc::new(IngestionPipeline::new(
            PipelineConfig::default(),
            SharedLedger::new(LedgerConfig {
                max_records,
                ..LedgerConfig::default()
            }),
            BatchValidator::new(BatchValidatorConfig::for_testing()),
            Arc::new(router),
        ))
    }

    /// A genesis record followed by a chain of `len - 1` children.
    fn chain(tag: &str, len: usize) -> Vec<TransactionRecord> {
        let mut records: Vec<TransactionRecord> = Vec::with_capacity(len);
        for i in 0..len {
            let parents = records.last().map(|r| vec![r.id()]).unwrap_or_default();
            records.push(
                TransactionRecord::new(tag, "sink", 1.0, 1.0 + i as f64, parents).unwrap(),
            );
        }
        records
    }

    #[test]
    fn test_concurrent_batches_all_commit() {
        let pipeline = shared_pipeline(100_000);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let pipeline = Arc::clone(&pipeline);
                thread::spawn(move || {
                    let cancel = CancellationFlag::new();
                    let mut inserted = 0;
                    for b in 0..10 {
                        let batch = chain(&format!("t{t}-b{b}"), 20);
                        inserted += pipeline.submit(batch, &cancel).unwrap().inserted_count();
                    }
                    inserted
                })
            })
            .collect();

        let inserted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(inserted, 8 * 10 * 20);

        let ledger = pipeline.ledger();
        assert_eq!(ledger.len(), 1_600);
        // One tip per chain.
        assert_eq!(ledger.tips().len(), 80);
        invariant_referential_integrity(&ledger.read()).unwrap();
        invariant_tips_consistent(&ledger.read()).unwrap();
    }

    #[test]
    fn test_same_batch_from_two_threads_inserts_once() {
        let pipeline = shared_pipeline(10_000);
        let batch = chain("shared", 50);

        let results: Vec<usize> = (0..2)
            .into_par_iter()
            .map(|_| {
                pipeline
                    .submit(batch.clone(), &CancellationFlag::new())
                    .unwrap()
                    .inserted_count()
            })
            .collect();

        assert_eq!(results.iter().sum::<usize>(), 50);
        assert_eq!(pipeline.ledger().len(), 50);
    }

    #[test]
    fn test_readers_see_consistent_tips_during_writes() {
        let pipeline = shared_pipeline(64);
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let ledger = pipeline.ledger().clone();
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut observations = 0;
                loop {
                    let guard = ledger.read();
                    invariant_referential_integrity(&guard).unwrap();
                    invariant_tips_consistent(&guard).unwrap();
                    drop(guard);
                    observations += 1;
                    if done.load(Ordering::SeqCst) {
                        return observations;
                    }
                }
            })
        };

        let cancel = CancellationFlag::new();
        for b in 0..50 {
            pipeline.submit(chain(&format!("w{b}"), 10), &cancel).unwrap();
        }
        done.store(true, Ordering::SeqCst);

        assert!(reader.join().unwrap() > 0);
        assert!(pipeline.ledger().len() <= 64);
    }

    #[test]
    fn test_routing_during_ring_updates() {
        let router = Arc::new(ShardRouter::with_shards(RouterConfig::for_testing(), 0..4).unwrap());
        let done = Arc::new(AtomicBool::new(false));

        let routers: Vec<_> = (0..4)
            .map(|t| {
                let router = Arc::clone(&router);
                let done = Arc::clone(&done);
                thread::spawn(move || {
                    let mut routed = 0u64;
                    loop {
                        let key = format!("key-{t}-{routed}");
                        let shard = router.route(key.as_bytes()).unwrap();
                        // Shards 0..4 are never removed; 4..8 come and go.
                        assert!(shard < 8);
                        routed += 1;
                        if done.load(Ordering::SeqCst) {
                            return routed;
                        }
                    }
                })
            })
            .collect();

        for round in 0..20 {
            let shard = 4 + (round % 4) as u16;
            router.add_shard(shard).unwrap();
            router.remove_shard(shard).unwrap();
        }
        done.store(true, Ordering::SeqCst);

        for handle in routers {
            assert!(handle.join().unwrap() > 0);
        }
        assert_eq!(router.shard_ids(), vec![0, 1, 2, 3]);
    }
}
