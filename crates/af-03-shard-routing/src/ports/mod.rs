//! # Ports Module
//!
//! Hexagonal architecture ports for the shard router.

pub mod inbound;

pub use inbound::ShardRoutingApi;
