//! # Ports Module
//!
//! Hexagonal architecture ports for the ingestion pipeline.

pub mod inbound;
pub mod outbound;

pub use inbound::IngestionApi;
pub use outbound::RecordSink;
