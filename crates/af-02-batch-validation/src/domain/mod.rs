//! # Domain Module
//!
//! Phase A, Phase B and the batch outcome types.

pub mod errors;
pub mod outcome;
pub mod structural;
pub mod topology;

pub use errors::*;
pub use outcome::*;
pub use structural::{chunk_len, run_structural_phase, StructuralPhase, PARALLEL_THRESHOLD};
pub use topology::run_topology_phase;
