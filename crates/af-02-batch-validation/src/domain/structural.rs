//! # Phase A - Structural Validation
//!
//! Data-parallel map-reduce over contiguous chunks of the batch.
//!
//! 1. Partition: one contiguous chunk per worker
//! 2. Map (Parallel): each worker checks its chunk and counts its own passes
//! 3. Reduce (Sequential): per-worker counts are summed, results concatenated
//!    in chunk order
//!
//! Workers share no mutable state, take no locks and do no I/O.

use rayon::prelude::*;
use shared_types::{validate_structure, StructuralFailure, TransactionRecord};

/// Batches smaller than this are checked on the calling thread.
pub const PARALLEL_THRESHOLD: usize = 64;

/// Result of Phase A.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuralPhase {
    /// Per-record result, in batch order.
    pub results: Vec<Result<(), StructuralFailure>>,
    /// Number of passing records.
    pub pass_count: usize,
}

/// Chunk length that gives each of `workers` one contiguous sub-range.
pub fn chunk_len(batch_len: usize, workers: usize) -> usize {
    let workers = workers.max(1);
    batch_len.div_ceil(workers).max(1)
}

/// Run Phase A, setting `validated` on every passing record.
///
/// `workers == 0` uses the rayon pool size.
pub fn run_structural_phase(
    records: &mut [TransactionRecord],
    workers: usize,
    parallel_threshold: usize,
) -> StructuralPhase {
    if records.len() < parallel_threshold {
        let (pass_count, results) = check_chunk(records);
        return StructuralPhase {
            results,
            pass_count,
        };
    }

    let workers = if workers == 0 {
        rayon::current_num_threads()
    } else {
        workers
    };

    let per_worker: Vec<(usize, Vec<Result<(), StructuralFailure>>)> = records
        .par_chunks_mut(chunk_len(records.len(), workers))
        .map(check_chunk)
        .collect();

    let mut results = Vec::with_capacity(records.len());
    let mut pass_count = 0;
    for (passed, chunk_results) in per_worker {
        pass_count += passed;
        results.extend(chunk_results);
    }

    StructuralPhase {
        results,
        pass_count,
    }
}

/// One worker's share: local pass count plus per-record results.
fn check_chunk(chunk: &mut [TransactionRecord]) -> (usize, Vec<Result<(), StructuralFailure>>) {
    let mut passed = 0;
    let results = chunk
        .iter_mut()
        .map(|record| {
            let result = validate_structure(record);
            if result.is_ok() {
                passed += 1;
            }
            result
        })
        .collect();
    (passed, results)
}
