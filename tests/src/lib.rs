//! # Aegis Fabric Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/integration/
//! │   ├── flows.rs        # Ledger + validation + routing + pipeline
//! │   └── concurrency.rs  # Concurrent batches, readers and ring updates
//! └── benches/
//!     └── pipeline_benchmarks.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p af-tests
//!
//! # By category
//! cargo test -p af-tests integration::flows
//! cargo test -p af-tests integration::concurrency
//!
//! # Benchmarks
//! cargo bench -p af-tests
//! ```

pub mod integration;
