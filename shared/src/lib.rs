//! Shared types and workflow core for the GACP Certification Platform
//!
//! This crate holds the certification application state machine and the
//! records it operates on. It performs no I/O; the backend persists its
//! results and the WASM module exposes its predicates to the frontend.

pub mod models;
pub mod types;
pub mod validation;
pub mod workflow;

pub use models::*;
pub use types::*;
pub use validation::*;
pub use workflow::*;
