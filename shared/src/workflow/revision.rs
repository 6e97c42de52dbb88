//! Revision policy: free versus paid correction cycles

use serde::{Deserialize, Serialize};

use super::status::WorkflowStatus;

/// Default number of rejections an applicant may correct without paying again
pub const DEFAULT_MAX_FREE_REVISIONS: u32 = 3;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevisionPolicy {
    pub max_free_revisions: u32,
}

/// Result of applying a rejection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RevisionDecision {
    pub revision_count: u32,
    pub next_status: WorkflowStatus,
}

impl Default for RevisionPolicy {
    fn default() -> Self {
        Self {
            max_free_revisions: DEFAULT_MAX_FREE_REVISIONS,
        }
    }
}

impl RevisionPolicy {
    pub fn new(max_free_revisions: u32) -> Self {
        Self { max_free_revisions }
    }

    /// Apply one rejection. The `max_free_revisions`-th rejection is the last
    /// free one; the next requires the milestone 1 fee again.
    pub fn on_rejection(&self, revision_count: u32) -> RevisionDecision {
        let revision_count = revision_count.saturating_add(1);
        let next_status = if self.requires_payment(revision_count) {
            WorkflowStatus::RejectedPaymentRequired
        } else {
            WorkflowStatus::RevisionRequested
        };
        RevisionDecision {
            revision_count,
            next_status,
        }
    }

    pub fn requires_payment(&self, revision_count: u32) -> bool {
        revision_count > self.max_free_revisions
    }

    pub fn free_revisions_remaining(&self, revision_count: u32) -> u32 {
        self.max_free_revisions.saturating_sub(revision_count)
    }

    /// True once the free allowance is exhausted, so the next rejection is
    /// paid. Lets the UI tell "0 free revisions left" apart from "still free".
    pub fn next_rejection_requires_payment(&self, revision_count: u32) -> bool {
        self.requires_payment(revision_count.saturating_add(1))
    }
}
