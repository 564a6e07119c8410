//! # Core Domain Entities
//!
//! - `TxId`: 32-byte content hash, rendered as lowercase hex.
//! - `TransactionRecord`: immutable-after-construction transfer record whose
//!   `id` is the SHA-256 of its canonical encoding.

use crate::errors::RecordError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

/// Domain tag prepended to every record encoding.
const RECORD_DOMAIN_TAG: &[u8] = b"aegis-fabric/tx/v1";

/// Content-derived transaction identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TxId(Hash);

impl TxId {
    /// Wrap raw hash bytes.
    pub const fn from_bytes(bytes: Hash) -> Self {
        Self(bytes)
    }

    /// Raw hash bytes.
    pub fn as_bytes(&self) -> &Hash {
        &self.0
    }

    /// Full lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First four bytes as hex, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxId({}..)", self.short())
    }
}

impl FromStr for TxId {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.trim(), &mut bytes)
            .map_err(|_| RecordError::MalformedId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for TxId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for TxId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A hash-chained financial transaction.
///
/// INVARIANTS:
/// - HASH-BINDING: `hash == H(sender, receiver, amount, timestamp, parent_hashes)`
/// - CONTENT-ADDRESSED: `id() == hash()`
///
/// Fields are read-only outside this crate. The only mutation is
/// `validated: false -> true`, performed by [`crate::integrity::validate_structure`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub(crate) sender: String,
    pub(crate) receiver: String,
    pub(crate) amount: f64,
    pub(crate) timestamp: f64,
    pub(crate) parent_hashes: Vec<TxId>,
    pub(crate) hash: TxId,
    /// Never read from input: a deserialized record must be re-validated.
    #[serde(skip)]
    pub(crate) validated: bool,
}

impl TransactionRecord {
    /// Construct a record and compute its content hash.
    ///
    /// # Errors
    /// - `DuplicateParent` if a parent hash is listed twice
    /// - `InvalidInput` if sender or receiver is empty
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        timestamp: f64,
        parent_hashes: Vec<TxId>,
    ) -> Result<Self, RecordError> {
        let sender = sender.into();
        let receiver = receiver.into();

        if sender.is_empty() || receiver.is_empty() {
            return Err(RecordError::InvalidInput(
                "sender and receiver must be non-empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(parent_hashes.len());
        for parent in &parent_hashes {
            if !seen.insert(*parent) {
                return Err(RecordError::DuplicateParent(*parent));
            }
        }

        let hash = compute_record_hash(&sender, &receiver, amount, timestamp, &parent_hashes);
        Ok(Self {
            sender,
            receiver,
            amount,
            timestamp,
            parent_hashes,
            hash,
            validated: false,
        })
    }

    /// Construct a parentless (genesis) record.
    pub fn genesis(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        timestamp: f64,
    ) -> Result<Self, RecordError> {
        Self::new(sender, receiver, amount, timestamp, Vec::new())
    }

    /// Construct a record stamped with the current wall-clock time.
    pub fn with_current_time(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: f64,
        parent_hashes: Vec<TxId>,
    ) -> Result<Self, RecordError> {
        Self::new(sender, receiver, amount, unix_now(), parent_hashes)
    }

    /// Content-derived identifier (equal to `hash()`).
    pub fn id(&self) -> TxId {
        self.hash
    }

    /// Stored content hash.
    pub fn hash(&self) -> TxId {
        self.hash
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    /// Causal predecessors, in construction order.
    pub fn parent_hashes(&self) -> &[TxId] {
        &self.parent_hashes
    }

    /// True when the record has no parents.
    pub fn is_genesis(&self) -> bool {
        self.parent_hashes.is_empty()
    }

    /// True once the record passed the structural check.
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// Hash of the record's current fields.
    pub fn recompute_hash(&self) -> TxId {
        compute_record_hash(
            &self.sender,
            &self.receiver,
            self.amount,
            self.timestamp,
            &self.parent_hashes,
        )
    }

    pub(crate) fn mark_validated(&mut self) {
        self.validated = true;
    }
}

/// Canonical, order-sensitive record hash.
///
/// Strings are length-prefixed so that field boundaries cannot shift.
pub fn compute_record_hash(
    sender: &str,
    receiver: &str,
    amount: f64,
    timestamp: f64,
    parent_hashes: &[TxId],
) -> TxId {
    let mut hasher = Sha256::new();
    hasher.update(RECORD_DOMAIN_TAG);
    for field in [sender, receiver] {
        hasher.update((field.len() as u64).to_be_bytes());
        hasher.update(field.as_bytes());
    }
    hasher.update(amount.to_bits().to_be_bytes());
    hasher.update(timestamp.to_bits().to_be_bytes());
    hasher.update((parent_hashes.len() as u64).to_be_bytes());
    for parent in parent_hashes {
        hasher.update(parent.as_bytes());
    }
    TxId(hasher.finalize().into())
}

/// Seconds since the Unix epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
