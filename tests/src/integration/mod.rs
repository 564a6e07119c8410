//! # Integration Tests
//!
//! Cross-subsystem flows.

pub mod concurrency;
pub mod flows;
