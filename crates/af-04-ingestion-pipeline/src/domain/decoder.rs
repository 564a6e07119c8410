//! # Decoder
//!
//! Newline-delimited JSON to normalized transaction drafts.
//!
//! ## Field Aliases
//!
//! | Field | Accepted keys | Default |
//! |-------|---------------|---------|
//! | sender | `sender`, `from` | `"unknown"` |
//! | receiver | `receiver`, `to` | `"burn_address"` |
//! | amount | `amount`, `value` (number or numeric string) | `0.0` |
//! | timestamp | `timestamp` | current time |
//! | parents | `parents`, `parent_hashes` (hex ids) | none |
//!
//! Blank and non-object lines are skipped. A missing amount decodes to 0.0 and
//! is then rejected by structural validation, not here.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::{unix_now, RecordError, TransactionRecord, TxId};
use tracing::debug;

/// Sender used when a payload names none.
pub const DEFAULT_SENDER: &str = "unknown";

/// Receiver used when a payload names none.
pub const DEFAULT_RECEIVER: &str = "burn_address";

/// A decoded, normalized transaction not yet hashed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    /// Sending account
    pub sender: String,
    /// Receiving account
    pub receiver: String,
    /// Transferred amount
    pub amount: f64,
    /// Creation time, if the payload carried one
    pub timestamp: Option<f64>,
    /// Parent ids
    pub parents: Vec<TxId>,
}

impl TransactionDraft {
    /// Construct the content-addressed record, stamping the current time when
    /// the payload carried none.
    pub fn into_record(self) -> Result<TransactionRecord, RecordError> {
        let timestamp = self.timestamp.unwrap_or_else(unix_now);
        TransactionRecord::new(
            self.sender,
            self.receiver,
            self.amount,
            timestamp,
            self.parents,
        )
    }
}

/// Why a line was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeFailure {
    /// Zero-based line number in the input
    pub line: usize,
    /// Human-readable reason
    pub reason: String,
}

/// Result of decoding one input batch.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DecodedBatch {
    /// Decoded drafts with their input line numbers, in input order.
    pub drafts: Vec<(usize, TransactionDraft)>,
    /// Lines that looked like objects but could not be decoded.
    pub failures: Vec<DecodeFailure>,
    /// Blank or non-object lines.
    pub skipped: usize,
}

/// Decode newline-delimited JSON.
pub fn decode_json_batch<S: AsRef<str>>(lines: &[S]) -> DecodedBatch {
    let mut batch = DecodedBatch::default();

    for (line_no, line) in lines.iter().enumerate() {
        let line = line.as_ref().trim();
        if !line.starts_with('{') {
            batch.skipped += 1;
            continue;
        }

        match decode_line(line) {
            Ok(draft) => batch.drafts.push((line_no, draft)),
            Err(reason) => {
                debug!("[af-04] Dropped line {}: {}", line_no, reason);
                batch.failures.push(DecodeFailure {
                    line: line_no,
                    reason,
                });
            }
        }
    }

    batch
}

/// Decode one JSON object.
pub fn decode_line(line: &str) -> Result<TransactionDraft, String> {
    let value: Value = serde_json::from_str(line).map_err(|e| format!("invalid JSON: {e}"))?;
    let object = value
        .as_object()
        .ok_or_else(|| "payload is not an object".to_string())?;

    let sender = text_field(object, &["sender", "from"]).unwrap_or(DEFAULT_SENDER);
    let receiver = text_field(object, &["receiver", "to"]).unwrap_or(DEFAULT_RECEIVER);
    let amount = number_field(object, &["amount", "value"])?.unwrap_or(0.0);
    let timestamp = number_field(object, &["timestamp"])?;
    let parents = parents_field(object)?;

    Ok(TransactionDraft {
        sender: sender.to_string(),
        receiver: receiver.to_string(),
        amount,
        timestamp,
        parents,
    })
}

/// First non-empty string among `keys`.
fn text_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| object.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

/// First present, non-null number among `keys`. Numeric strings are parsed.
fn number_field(object: &Map<String, Value>, keys: &[&str]) -> Result<Option<f64>, String> {
    for key in keys {
        match object.get(*key) {
            None | Some(Value::Null) => continue,
            Some(Value::Number(n)) => {
                return n
                    .as_f64()
                    .map(Some)
                    .ok_or_else(|| format!("{key} is out of range"))
            }
            Some(Value::String(s)) => {
                return s
                    .trim()
                    .parse::<f64>()
                    .map(Some)
                    .map_err(|_| format!("{key} is not numeric: {s:?}"))
            }
            Some(other) => return Err(format!("{key} has unsupported type: {other}")),
        }
    }
    Ok(None)
}

fn parents_field(object: &Map<String, Value>) -> Result<Vec<TxId>, String> {
    let Some(value) = object.get("parents").or_else(|| object.get("parent_hashes")) else {
        return Ok(Vec::new());
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| "parent id is not a string".to_string())?
                    .parse::<TxId>()
                    .map_err(|e| e.to_string())
            })
            .collect(),
        _ => Err("parents is not an array".to_string()),
    }
}
