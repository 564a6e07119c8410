//! # Integration Test Flows
//!
//! Tests that af-01-dag-ledger, af-02-batch-validation, af-03-shard-routing
//! and af-04-ingestion-pipeline work together.
//!
//! ## Flows Tested
//!
//! 1. **Genesis -> child -> orphan**: tips move forward, orphans never land
//! 2. **Partial failure**: invalid records are itemized, valid ones commit
//! 3. **Intra-batch topology**: only earlier accepted siblings resolve
//! 4. **Bounded retention**: eviction keeps the DAG referentially sound
//! 5. **Rebalancing**: shard changes move only the expected keys
//! 6. **Tamper audit**: corrupted retained records are reported
//! 7. **Write-behind**: committed records reach the sink with their shard

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use af_01_dag_ledger::{
        invariant_referential_integrity, invariant_tips_consistent, invariant_within_bound,
        AncestorStatus, LedgerConfig, LedgerReader, RecordingAuditSink, RetentionPolicy,
        SharedLedger, TrustStatus,
    };
    use af_02_batch_validation::{
        AcceptancePolicy, BatchValidationApi, BatchValidator, BatchValidatorConfig,
        TopologyFailure, TopologyStatus,
    };
    use af_03_shard_routing::{RouterConfig, ShardRouter, ShardRoutingApi};
    use af_04_ingestion_pipeline::{
        CancellationFlag, IngestionApi, IngestionPipeline, InsertionStatus, MemoryRecordSink,
        PipelineConfig, RecordSink, WriteBehind,
    };
    use shared_types::{StructuralFailure, TransactionRecord, TxId};

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn build_pipeline(ledger: LedgerConfig, acceptance: AcceptancePolicy) -> IngestionPipeline {
        let router = ShardRouter::with_shards(RouterConfig::default(), 0..4).unwrap();
        IngestionPipeline::new(
            PipelineConfig {
                acceptance,
                ..PipelineConfig::default()
            },
            SharedLedger::new(ledger),
            BatchValidator::new(BatchValidatorConfig::for_testing()),
            Arc::new(router),
        )
    }

    fn tx(sender: &str, amount: f64, timestamp: f64, parents: Vec<TxId>) -> TransactionRecord {
        TransactionRecord::new(sender, "receiver", amount, timestamp, parents).unwrap()
    }

    fn check_ledger(ledger: &SharedLedger) {
        let guard = ledger.read();
        invariant_referential_integrity(&guard).unwrap();
        invariant_tips_consistent(&guard).unwrap();
        invariant_within_bound(&guard).unwrap();
    }

    // =============================================================================
    // GENESIS -> CHILD -> ORPHAN
    // =============================================================================

    #[test]
    fn test_end_to_end_genesis_child_and_unknown_parent() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Partial);
        let cancel = CancellationFlag::new();
        let ledger = pipeline.ledger().clone();

        let g = tx("alice", 10.0, 1.0, vec![]);
        let t1 = tx("bob", 5.0, 2.0, vec![g.id()]);
        pipeline.submit(vec![g.clone()], &cancel).unwrap();
        pipeline.submit(vec![t1.clone()], &cancel).unwrap();
        assert_eq!(ledger.tips(), vec![t1.id()]);

        let before = ledger.stats();
        let t2 = tx("carol", 1.0, 3.0, vec![TxId::from_bytes([0x42; 32])]);
        let report = pipeline.submit(vec![t2.clone()], &cancel).unwrap();

        assert!(report.all_valid());
        assert!(matches!(
            report.records[0].topology,
            TopologyStatus::Failed(TopologyFailure::UnresolvedParent(_))
        ));
        assert_eq!(report.records[0].insertion, InsertionStatus::Rejected);
        assert!(!ledger.contains(&t2.id()));
        assert_eq!(ledger.stats(), before);
        assert_eq!(ledger.tips(), vec![t1.id()]);
        check_ledger(&ledger);
    }

    #[test]
    fn test_unparsable_parent_never_reaches_core() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Partial);
        let lines = vec![
            r#"{"sender":"carol","receiver":"dave","amount":1,"parents":["nonexistent-hash"]}"#
                .to_string(),
        ];
        let report = pipeline
            .ingest_lines(&lines, &CancellationFlag::new())
            .unwrap();
        assert_eq!(report.total(), 0);
        assert_eq!(report.decode_failures.len(), 1);
        assert!(pipeline.ledger().is_empty());
    }

    // =============================================================================
    // PARTIAL FAILURE
    // =============================================================================

    #[test]
    fn test_partial_failure_batch() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Partial);
        let batch = vec![
            tx("s0", 1.0, 1.0, vec![]),
            tx("s1", 0.0, 1.0, vec![]),
            tx("s2", 1.0, 2.0, vec![]),
            tx("s3", 1.0, 0.0, vec![]),
            tx("s4", 1.0, 3.0, vec![]),
        ];
        let report = pipeline.submit(batch, &CancellationFlag::new()).unwrap();

        assert_eq!(report.structural_pass_count, 3);
        assert!(!report.all_valid());
        assert_eq!(
            report.records[1].structural,
            Err(StructuralFailure::NonPositiveAmount)
        );
        assert_eq!(
            report.records[3].structural,
            Err(StructuralFailure::NonPositiveTimestamp)
        );
        let inserted: Vec<usize> = report
            .records
            .iter()
            .filter(|r| r.insertion == InsertionStatus::Inserted)
            .map(|r| r.index)
            .collect();
        assert_eq!(inserted, vec![0, 2, 4]);
        assert_eq!(pipeline.ledger().len(), 3);
    }

    #[test]
    fn test_strict_acceptance_is_all_or_nothing() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Strict);
        let cancel = CancellationFlag::new();

        let mixed = vec![tx("s0", 1.0, 1.0, vec![]), tx("s1", -1.0, 1.0, vec![])];
        let report = pipeline.submit(mixed, &cancel).unwrap();
        assert_eq!(report.inserted_count(), 0);
        assert_eq!(report.count(InsertionStatus::NotAdmitted), 1);
        assert!(pipeline.ledger().is_empty());

        let clean = vec![tx("s0", 1.0, 1.0, vec![]), tx("s1", 1.0, 1.0, vec![])];
        let report = pipeline.submit(clean, &cancel).unwrap();
        assert_eq!(report.inserted_count(), 2);
    }

    // =============================================================================
    // INTRA-BATCH TOPOLOGY
    // =============================================================================

    #[test]
    fn test_chain_in_one_batch_commits_in_order() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Partial);
        let a = tx("a", 1.0, 1.0, vec![]);
        let b = tx("b", 1.0, 2.0, vec![a.id()]);
        let c = tx("c", 1.0, 3.0, vec![a.id(), b.id()]);

        let report = pipeline
            .submit(vec![a, b, c.clone()], &CancellationFlag::new())
            .unwrap();
        assert_eq!(report.inserted_count(), 3);
        assert_eq!(pipeline.ledger().tips(), vec![c.id()]);
        check_ledger(pipeline.ledger());
    }

    #[test]
    fn test_forward_reference_and_rejected_sibling() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Partial);
        let a = tx("a", 1.0, 1.0, vec![]);
        let b = tx("b", 1.0, 2.0, vec![a.id()]);
        let bad = tx("bad", 0.0, 1.0, vec![]);
        let child_of_bad = tx("cob", 1.0, 2.0, vec![bad.id()]);

        let report = pipeline
            .submit(
                vec![b.clone(), a.clone(), bad, child_of_bad],
                &CancellationFlag::new(),
            )
            .unwrap();

        assert!(matches!(
            report.records[0].topology,
            TopologyStatus::Failed(TopologyFailure::ForwardReference { position: 1, .. })
        ));
        assert_eq!(report.records[1].insertion, InsertionStatus::Inserted);
        assert_eq!(report.records[2].topology, TopologyStatus::Skipped);
        assert!(matches!(
            report.records[3].topology,
            TopologyStatus::Failed(TopologyFailure::ParentStructurallyInvalid(_))
        ));
        assert_eq!(pipeline.ledger().len(), 1);
        assert!(!pipeline.ledger().contains(&b.id()));
    }

    #[test]
    fn test_validator_against_ledger_snapshot() {
        let ledger = SharedLedger::new(LedgerConfig::default());
        let pipeline = IngestionPipeline::new(
            PipelineConfig::default(),
            ledger.clone(),
            BatchValidator::default(),
            Arc::new(ShardRouter::with_shards(RouterConfig::default(), 0..2).unwrap()),
        );
        let g = tx("g", 1.0, 1.0, vec![]);
        pipeline
            .submit(vec![g.clone()], &CancellationFlag::new())
            .unwrap();

        let mut batch = vec![tx("t", 1.0, 2.0, vec![g.id()])];
        let guard = ledger.read();
        let outcome = BatchValidator::default().validate(&mut batch, &*guard);
        assert!(outcome.all_accepted());
    }

    // =============================================================================
    // BOUNDED RETENTION
    // =============================================================================

    #[test]
    fn test_strict_retention_never_drops_referenced_records() {
        let config = LedgerConfig {
            max_records: 8,
            ..LedgerConfig::default()
        };
        let pipeline = build_pipeline(config, AcceptancePolicy::Partial);
        let cancel = CancellationFlag::new();

        // Fill the ledger with a chain: one tip, seven referenced records.
        let mut chain = vec![tx("chain", 1.0, 1.0, vec![])];
        for i in 0..8 {
            let parent = chain[chain.len() - 1].id();
            chain.push(tx("chain", 1.0, 2.0 + i as f64, vec![parent]));
        }
        let report = pipeline.submit(chain[..8].to_vec(), &cancel).unwrap();
        assert_eq!(report.inserted_count(), 8);

        // Extending the chain would need to evict its own parent.
        let report = pipeline.submit(vec![chain[8].clone()], &cancel).unwrap();
        assert_eq!(
            report.records[0].insertion,
            InsertionStatus::CapacityExceeded
        );

        // An unrelated record evicts the tip; its parent becomes the new tip.
        let side = tx("side", 1.0, 50.0, vec![]);
        let report = pipeline.submit(vec![side.clone()], &cancel).unwrap();
        assert_eq!(report.inserted_count(), 1);

        let ledger = pipeline.ledger();
        assert_eq!(ledger.len(), 8);
        assert!(!ledger.contains(&chain[7].id()));
        assert_eq!(ledger.tips(), vec![chain[6].id(), side.id()]);
        assert_eq!(ledger.stats().pruned, 0);
        check_ledger(ledger);
    }

    #[test]
    fn test_prune_ancestors_then_child_of_pruned_parent() {
        let config = LedgerConfig {
            max_records: 4,
            ..LedgerConfig::default()
        }
        .with_policy(RetentionPolicy::PruneAncestors);
        let pipeline = build_pipeline(config, AcceptancePolicy::Partial);
        let cancel = CancellationFlag::new();

        let g = tx("g", 1.0, 1.0, vec![]);
        let mut chain = vec![g.clone()];
        for i in 0..6 {
            let parent = chain[chain.len() - 1].id();
            chain.push(tx("c", 1.0, 2.0 + i as f64, vec![parent]));
        }
        for record in &chain {
            pipeline.submit(vec![record.clone()], &cancel).unwrap();
        }

        let ledger = pipeline.ledger();
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.ancestor_status(&g.id()), AncestorStatus::Unknown);
        let oldest_retained = &chain[3];
        assert_eq!(
            ledger.ancestor_status(&chain[2].id()),
            AncestorStatus::Pruned
        );
        assert!(ledger.contains(&oldest_retained.id()));

        // A new record may still cite the pruned ancestor.
        let late = tx("late", 1.0, 20.0, vec![chain[2].id()]);
        let report = pipeline.submit(vec![late.clone()], &cancel).unwrap();
        assert!(matches!(
            report.records[0].topology,
            TopologyStatus::Resolved {
                unknown_ancestors: 1
            }
        ));
        assert!(ledger.contains(&late.id()));
        check_ledger(ledger);
    }

    #[test]
    fn test_retention_window_evicts_old_records() {
        let config = LedgerConfig {
            retention_window_secs: Some(10.0),
            ..LedgerConfig::default()
        };
        let pipeline = build_pipeline(config, AcceptancePolicy::Partial);
        let old = tx("old", 1.0, 1.0, vec![]);
        let new = tx("new", 1.0, 100.0, vec![]);
        let report = pipeline
            .submit(vec![old.clone(), new.clone()], &CancellationFlag::new())
            .unwrap();

        assert_eq!(report.evicted, vec![old.id()]);
        assert!(!pipeline.ledger().contains(&old.id()));
        assert!(pipeline.ledger().contains(&new.id()));
    }

    // =============================================================================
    // REBALANCING
    // =============================================================================

    #[test]
    fn test_remap_bound_over_trials() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let keys: Vec<[u8; 16]> = (0..5_000).map(|_| rng.gen()).collect();

        for n in [2u16, 5, 10] {
            let router = ShardRouter::with_shards(RouterConfig::default(), 0..n).unwrap();
            let before: Vec<_> = keys.iter().map(|k| router.route(k).unwrap()).collect();

            router.add_shard(n).unwrap();
            let moved = keys
                .iter()
                .zip(&before)
                .filter(|(k, old)| router.route(*k).unwrap() != **old)
                .count();

            let expected = keys.len() as f64 / (n as f64 + 1.0);
            assert!(
                (moved as f64) < expected * 1.6,
                "n = {}: moved {} keys, expected about {:.0}",
                n,
                moved,
                expected
            );
        }
    }

    #[test]
    fn test_records_follow_sender_across_rebalance() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Partial);
        let senders: Vec<String> = (0..200).map(|i| format!("acct-{i}")).collect();
        let router = pipeline.router().clone();
        let before: Vec<_> = senders
            .iter()
            .map(|s| router.route(s.as_bytes()).unwrap())
            .collect();

        router.remove_shard(1).unwrap();

        let batch: Vec<_> = senders
            .iter()
            .enumerate()
            .map(|(i, s)| tx(s, 1.0, 1.0 + i as f64, vec![]))
            .collect();
        let report = pipeline.submit(batch, &CancellationFlag::new()).unwrap();

        for (record, old) in report.records.iter().zip(&before) {
            let shard = record.shard.unwrap();
            assert_ne!(shard, 1);
            if *old != 1 {
                assert_eq!(shard, *old);
            }
        }
    }

    // =============================================================================
    // TAMPER AUDIT
    // =============================================================================

    #[test]
    fn test_tampered_record_rejected_and_audited() {
        let pipeline = build_pipeline(LedgerConfig::default(), AcceptancePolicy::Partial);
        let cancel = CancellationFlag::new();

        // A payload whose hash was forged after the fact never validates.
        let genuine = tx("alice", 10.0, 1.0, vec![]);
        let mut json: serde_json::Value = serde_json::to_value(&genuine).unwrap();
        json["amount"] = serde_json::json!(1000.0);
        let forged: TransactionRecord = serde_json::from_value(json).unwrap();
        let report = pipeline.submit(vec![forged], &cancel).unwrap();
        assert_eq!(
            report.records[0].structural,
            Err(StructuralFailure::HashMismatch)
        );
        assert!(pipeline.ledger().is_empty());

        // A clean ledger audits clean.
        pipeline.submit(vec![genuine.clone()], &cancel).unwrap();
        let sink = RecordingAuditSink::new();
        assert_eq!(pipeline.audit(&sink), 0);
        assert_eq!(
            pipeline.ledger().read().trust_status(&genuine.id()),
            Some(TrustStatus::Trusted)
        );
    }

    #[test]
    fn test_distinct_ids_for_distinct_content() {
        let ids: HashSet<TxId> = (0..500)
            .map(|i| tx("s", 1.0 + i as f64, 1.0, vec![]).id())
            .collect();
        assert_eq!(ids.len(), 500);
    }

    // =============================================================================
    // WRITE-BEHIND
    // =============================================================================

    #[tokio::test]
    async fn test_committed_records_reach_sink_with_their_shard() {
        let sink = Arc::new(MemoryRecordSink::new());
        let (write_behind, handle) = WriteBehind::spawn(sink.clone() as Arc<dyn RecordSink>);
        let pipeline = build_pipeline(LedgerConfig::for_testing(), AcceptancePolicy::Partial)
            .with_write_behind(write_behind);

        let g = tx("alice", 10.0, 1.0, vec![]);
        let t1 = tx("bob", 5.0, 2.0, vec![g.id()]);
        let bad = tx("carol", 0.0, 3.0, vec![]);
        let report = pipeline
            .submit(vec![g.clone(), t1.clone(), bad], &CancellationFlag::new())
            .unwrap();
        assert_eq!(report.inserted_count(), 2);

        let expected: Vec<(u16, TxId)> = report
            .records
            .iter()
            .filter(|r| r.insertion == InsertionStatus::Inserted)
            .map(|r| (r.shard.unwrap(), r.id))
            .collect();

        drop(pipeline);
        let stats = handle.await.unwrap();
        assert_eq!(stats.persisted, 2);
        assert_eq!(stats.failed, 0);

        let stored: Vec<(u16, TxId)> = sink
            .stored()
            .into_iter()
            .map(|(shard, record)| (shard, record.id()))
            .collect();
        assert_eq!(stored, expected);
    }
}
