//! # Consistent Hashing
//!
//! Ring positions for virtual nodes and routing keys.
//!
//! A position is the first 8 bytes (big endian) of SHA-256 of the input, so
//! every process computes the same ring for the same shard set.

use crate::domain::ShardId;
use sha2::{Digest, Sha256};

/// Ring position of arbitrary bytes.
pub fn ring_position(data: &[u8]) -> u64 {
    let digest = Sha256::digest(data);
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Label of the `replica`-th virtual node of `shard`.
pub fn point_label(shard: ShardId, replica: u32) -> String {
    format!("{shard}#{replica}")
}

/// Ring positions of every virtual node of `shard`.
pub fn shard_points(shard: ShardId, virtual_nodes: u32) -> impl Iterator<Item = u64> {
    (0..virtual_nodes).map(move |replica| ring_position(point_label(shard, replica).as_bytes()))
}

/// Index of the first point with `position >= key_position`, wrapping to 0.
///
/// `points` must be sorted by position and non-empty.
pub fn successor_index(points: &[(u64, ShardId)], key_position: u64) -> usize {
    let index = points.partition_point(|(position, _)| *position < key_position);
    if index == points.len() {
        0
    } else {
        index
    }
}
