//! # Node Runtime Library
//!
//! This library exposes the runtime's modules for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `config`: `NodeConfig::from_env()` over `AF_*` variables
//! - `telemetry`: tracing subscriber (pretty or JSON)
//! - `runtime`: subsystem wiring and the stdin batch loop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod runtime;
pub mod telemetry;

pub use config::{ConfigError, NodeConfig, DEFAULT_BATCH_SIZE, DEFAULT_SHARDS};
pub use runtime::{NodeRuntime, RunSummary};
pub use telemetry::{init_tracing, TelemetryError};
