//! # Adapters Module
//!
//! Record sinks and the write-behind queue.

pub mod sinks;
pub mod write_behind;

pub use sinks::{MemoryRecordSink, TracingRecordSink};
pub use write_behind::{PersistRequest, WriteBehind, WriteBehindStats};
