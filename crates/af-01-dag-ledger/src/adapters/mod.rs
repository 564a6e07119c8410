//! # Adapters Module
//!
//! Concurrency wrapper implementing the inbound read port.

pub mod shared;

pub use shared::SharedLedger;
