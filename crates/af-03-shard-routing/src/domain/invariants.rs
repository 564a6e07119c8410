//! # Domain Invariants
//!
//! Rules that must always hold for a shard ring.

use super::entities::ShardRing;
use super::errors::ShardId;

/// Invariant: routing depends only on the shard set.
///
/// A ring rebuilt from the same shards, joined in reverse order, routes
/// `key` to the same shard.
pub fn invariant_deterministic_route(ring: &ShardRing, key: &[u8]) -> bool {
    let rebuilt = ring
        .shard_ids()
        .into_iter()
        .rev()
        .try_fold(ShardRing::new(ring.virtual_nodes()), |acc, shard| {
            acc.with_shard(shard)
        });
    match rebuilt {
        Ok(rebuilt) => rebuilt.route(key) == ring.route(key) && rebuilt == *ring,
        Err(_) => false,
    }
}

/// Invariant: points are sorted and every shard owns exactly
/// `virtual_nodes` of them.
pub fn invariant_ring_well_formed(ring: &ShardRing) -> bool {
    let sorted = ring.points().windows(2).all(|w| w[0] <= w[1]);
    let expected = ring.shard_count() * ring.virtual_nodes() as usize;
    let owned_by_registered = ring.points().iter().all(|(_, shard)| ring.contains(*shard));
    sorted && ring.points().len() == expected && owned_by_registered
}

/// Invariant: after adding `added`, a key either kept its shard or moved to
/// `added`.
pub fn invariant_add_moves_only_to_new_shard(
    before: ShardId,
    after: ShardId,
    added: ShardId,
) -> bool {
    before == after || after == added
}

/// Invariant: after removing `removed`, only keys it owned changed shard.
pub fn invariant_remove_moves_only_orphans(
    before: ShardId,
    after: ShardId,
    removed: ShardId,
) -> bool {
    before == after || before == removed
}
