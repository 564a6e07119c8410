//! # Ports Module

pub mod inbound;
pub mod outbound;

pub use inbound::BatchValidationApi;
pub use outbound::ParentResolver;
