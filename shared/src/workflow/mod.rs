//! Certification application workflow
//!
//! Pure functions over `(status, counters)`: the status model, the payment
//! gate evaluator, the revision policy and the transition function. Nothing
//! here holds state between calls or performs I/O; the single-writer guarantee
//! per application is enforced by the persistence layer's version check.

mod error;
mod notify;
mod payment_gate;
mod revision;
mod status;
mod transition;

pub use error::*;
pub use notify::*;
pub use payment_gate::*;
pub use revision::*;
pub use status::*;
pub use transition::*;
