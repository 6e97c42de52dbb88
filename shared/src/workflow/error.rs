//! Workflow error taxonomy

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Milestone, UserRole};

use super::status::WorkflowStatus;

/// Errors returned by the workflow core. Every failure is a value; the core
/// never panics on input from its declared domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// The event is not valid for the current status. Nothing may be persisted.
    #[error("event {event} is not valid in status {from}")]
    InvalidTransition {
        from: WorkflowStatus,
        event: &'static str,
    },

    /// A stored value is outside the closed set. Fatal: operators must be alerted.
    #[error("corrupt workflow state: {0}")]
    CorruptState(String),

    /// Another writer updated the application first
    #[error("application {application_id} was modified concurrently")]
    ConcurrencyConflict { application_id: Uuid },

    #[error("role {role} may not perform {event}")]
    NotPermitted { role: UserRole, event: &'static str },

    #[error("payment for {milestone} has not been completed")]
    PaymentNotCompleted { milestone: Milestone },
}

impl WorkflowError {
    /// Recoverable errors are shown to the user; `CorruptState` is not
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, WorkflowError::CorruptState(_))
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
