//! Workflow transition function
//!
//! `transition(current, event, context)` maps a status and an event to the
//! next status. It never mutates anything: callers persist the outcome under
//! their own concurrency guard, or drop it on error.

use serde::{Deserialize, Serialize};

use crate::models::{Application, AssessmentType, Milestone, PaymentReceipt, UserRole};

use super::error::{WorkflowError, WorkflowResult};
use super::revision::RevisionPolicy;
use super::status::{AssessmentPhase, WorkflowStatus};

/// Something that happened to an application
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowEvent {
    /// Applicant submits a draft or a corrected application
    Submit,
    /// An invoice was issued for the milestone
    PaymentRequested { milestone: Milestone },
    /// The payment service reports a settled payment
    PaymentConfirmed { receipt: PaymentReceipt },
    /// A reviewer picks up a paid application
    ReviewStart,
    ReviewApprove,
    /// Rejection the applicant can correct, subject to the revision policy
    ReviewReject,
    /// Final rejection, no correction offered
    Reject,
    AssessmentSchedule { assessment_type: AssessmentType },
    AssessmentStart,
    /// Auditor filed the report; verdict still pending
    AssessmentReportFiled,
    AssessmentComplete {
        assessment_type: AssessmentType,
        passed: bool,
    },
    Expire,
    Revoke,
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::Submit => "SUBMIT",
            WorkflowEvent::PaymentRequested { .. } => "PAYMENT_REQUESTED",
            WorkflowEvent::PaymentConfirmed { .. } => "PAYMENT_CONFIRMED",
            WorkflowEvent::ReviewStart => "REVIEW_START",
            WorkflowEvent::ReviewApprove => "REVIEW_APPROVE",
            WorkflowEvent::ReviewReject => "REVIEW_REJECT",
            WorkflowEvent::Reject => "REJECT",
            WorkflowEvent::AssessmentSchedule { .. } => "ASSESSMENT_SCHEDULE",
            WorkflowEvent::AssessmentStart => "ASSESSMENT_START",
            WorkflowEvent::AssessmentReportFiled => "ASSESSMENT_REPORT_FILED",
            WorkflowEvent::AssessmentComplete { .. } => "ASSESSMENT_COMPLETE",
            WorkflowEvent::Expire => "EXPIRE",
            WorkflowEvent::Revoke => "REVOKE",
        }
    }

    /// Roles allowed to raise this event
    pub fn allowed_roles(&self) -> &'static [UserRole] {
        use UserRole::*;
        match self {
            WorkflowEvent::Submit => &[Applicant],
            WorkflowEvent::PaymentRequested { .. } | WorkflowEvent::PaymentConfirmed { .. } => {
                &[System, Admin]
            }
            WorkflowEvent::ReviewStart
            | WorkflowEvent::ReviewApprove
            | WorkflowEvent::ReviewReject
            | WorkflowEvent::Reject => &[Reviewer, Admin],
            WorkflowEvent::AssessmentSchedule { .. }
            | WorkflowEvent::AssessmentStart
            | WorkflowEvent::AssessmentReportFiled
            | WorkflowEvent::AssessmentComplete { .. } => &[Auditor, Admin],
            WorkflowEvent::Expire | WorkflowEvent::Revoke => &[System, Admin],
        }
    }

    pub fn is_permitted_for(&self, role: UserRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// Explicit inputs the transition depends on besides the status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionContext {
    pub actor: UserRole,
    pub revision_count: u32,
    pub policy: RevisionPolicy,
}

impl TransitionContext {
    pub fn new(actor: UserRole, revision_count: u32, policy: RevisionPolicy) -> Self {
        Self {
            actor,
            revision_count,
            policy,
        }
    }

    pub fn for_application(application: &Application, actor: UserRole) -> Self {
        Self::new(
            actor,
            application.revision_count,
            application.revision_policy(),
        )
    }
}

/// The state an application moves to. Applying it is the caller's job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub from: WorkflowStatus,
    pub to: WorkflowStatus,
    pub event: WorkflowEvent,
    pub revision_count: u32,
}

/// Compute the next status for `event` in `current`.
pub fn transition(
    current: WorkflowStatus,
    event: &WorkflowEvent,
    context: &TransitionContext,
) -> WorkflowResult<TransitionOutcome> {
    let invalid = || WorkflowError::InvalidTransition {
        from: current,
        event: event.name(),
    };

    if current.is_terminal() {
        return Err(invalid());
    }

    if !event.is_permitted_for(context.actor) {
        return Err(WorkflowError::NotPermitted {
            role: context.actor,
            event: event.name(),
        });
    }

    let mut revision_count = context.revision_count;

    let next = match (current, event) {
        (WorkflowStatus::Draft, WorkflowEvent::Submit) => WorkflowStatus::Submitted,
        (WorkflowStatus::RevisionRequested, WorkflowEvent::Submit) => WorkflowStatus::UnderReview,

        (
            WorkflowStatus::Submitted,
            WorkflowEvent::PaymentRequested {
                milestone: Milestone::DocumentReview,
            },
        ) => WorkflowStatus::PaymentPendingReview,
        (
            WorkflowStatus::ReviewApproved,
            WorkflowEvent::PaymentRequested {
                milestone: Milestone::Assessment,
            },
        ) => WorkflowStatus::PaymentPendingAssessment,

        (status, WorkflowEvent::PaymentConfirmed { receipt }) => {
            if status.payment_milestone() != Some(receipt.milestone) {
                return Err(invalid());
            }
            if !receipt.is_settled_in_full() {
                return Err(WorkflowError::PaymentNotCompleted {
                    milestone: receipt.milestone,
                });
            }
            match receipt.milestone {
                Milestone::DocumentReview => WorkflowStatus::PaymentConfirmedReview,
                Milestone::Assessment => WorkflowStatus::PaymentConfirmedAssessment,
                Milestone::CertificateIssuance => return Err(invalid()),
            }
        }

        (WorkflowStatus::PaymentConfirmedReview, WorkflowEvent::ReviewStart) => {
            WorkflowStatus::UnderReview
        }
        (WorkflowStatus::UnderReview, WorkflowEvent::ReviewApprove) => {
            WorkflowStatus::ReviewApproved
        }
        (WorkflowStatus::UnderReview, WorkflowEvent::ReviewReject) => {
            let decision = context.policy.on_rejection(revision_count);
            revision_count = decision.revision_count;
            decision.next_status
        }

        (
            WorkflowStatus::PaymentConfirmedAssessment,
            WorkflowEvent::AssessmentSchedule { assessment_type },
        ) => WorkflowStatus::for_assessment(*assessment_type, AssessmentPhase::Scheduled),

        (status, WorkflowEvent::AssessmentStart) => match status.assessment() {
            Some((kind, AssessmentPhase::Scheduled)) => {
                WorkflowStatus::for_assessment(kind, AssessmentPhase::InProgress)
            }
            _ => return Err(invalid()),
        },

        (status, WorkflowEvent::AssessmentReportFiled) => match status.assessment() {
            Some((kind, AssessmentPhase::InProgress)) => {
                WorkflowStatus::for_assessment(kind, AssessmentPhase::Completed)
            }
            _ => return Err(invalid()),
        },

        (
            status,
            WorkflowEvent::AssessmentComplete {
                assessment_type,
                passed,
            },
        ) => match status.assessment() {
            Some((kind, AssessmentPhase::InProgress | AssessmentPhase::Completed))
                if kind == *assessment_type =>
            {
                if *passed {
                    WorkflowStatus::Certified
                } else {
                    let decision = context.policy.on_rejection(revision_count);
                    revision_count = decision.revision_count;
                    decision.next_status
                }
            }
            _ => return Err(invalid()),
        },

        (status, WorkflowEvent::Reject) if status != WorkflowStatus::Draft => {
            WorkflowStatus::Rejected
        }
        (status, WorkflowEvent::Expire) if status != WorkflowStatus::Draft => {
            WorkflowStatus::Expired
        }
        (status, WorkflowEvent::Revoke) if status != WorkflowStatus::Draft => {
            WorkflowStatus::Revoked
        }

        _ => return Err(invalid()),
    };

    Ok(TransitionOutcome {
        from: current,
        to: next,
        event: *event,
        revision_count,
    })
}

/// Transition from a persisted status string. Unknown values surface as
/// [`WorkflowError::CorruptState`].
pub fn transition_raw(
    current: &str,
    event: &WorkflowEvent,
    context: &TransitionContext,
) -> WorkflowResult<TransitionOutcome> {
    let status: WorkflowStatus = current.parse()?;
    transition(status, event, context)
}

/// Whether the event would be accepted, for gating navigation in the UI
pub fn can_apply(
    current: WorkflowStatus,
    event: &WorkflowEvent,
    context: &TransitionContext,
) -> bool {
    transition(current, event, context).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PaymentStatus;
    use rust_decimal::Decimal;

    fn ctx(actor: UserRole) -> TransitionContext {
        TransitionContext::new(actor, 0, RevisionPolicy::default())
    }

    fn receipt(milestone: Milestone, status: PaymentStatus, amount: i64) -> WorkflowEvent {
        WorkflowEvent::PaymentConfirmed {
            receipt: PaymentReceipt {
                milestone,
                status,
                amount: Decimal::from(amount),
            },
        }
    }

    #[test]
    fn test_submit_draft() {
        let outcome = transition(
            WorkflowStatus::Draft,
            &WorkflowEvent::Submit,
            &ctx(UserRole::Applicant),
        )
        .unwrap();
        assert_eq!(outcome.to, WorkflowStatus::Submitted);
        assert_eq!(outcome.revision_count, 0);
    }

    #[test]
    fn test_review_payment_requires_completed_receipt() {
        let system = ctx(UserRole::System);
        let pending = receipt(Milestone::DocumentReview, PaymentStatus::Pending, 5000);
        assert_eq!(
            transition(WorkflowStatus::PaymentPendingReview, &pending, &system),
            Err(WorkflowError::PaymentNotCompleted {
                milestone: Milestone::DocumentReview
            })
        );

        let short = receipt(Milestone::DocumentReview, PaymentStatus::Completed, 4999);
        assert!(transition(WorkflowStatus::PaymentPendingReview, &short, &system).is_err());

        let paid = receipt(Milestone::DocumentReview, PaymentStatus::Completed, 5000);
        let outcome = transition(WorkflowStatus::PaymentPendingReview, &paid, &system).unwrap();
        assert_eq!(outcome.to, WorkflowStatus::PaymentConfirmedReview);
    }

    #[test]
    fn test_wrong_milestone_is_invalid() {
        let paid = receipt(Milestone::Assessment, PaymentStatus::Completed, 25000);
        let err = transition(
            WorkflowStatus::PaymentPendingReview,
            &paid,
            &ctx(UserRole::System),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn test_wrong_role_is_not_permitted() {
        let err = transition(
            WorkflowStatus::UnderReview,
            &WorkflowEvent::ReviewApprove,
            &ctx(UserRole::Applicant),
        )
        .unwrap_err();
        assert_eq!(
            err,
            WorkflowError::NotPermitted {
                role: UserRole::Applicant,
                event: "REVIEW_APPROVE"
            }
        );
    }

    #[test]
    fn test_assessment_type_must_match_track() {
        let err = transition(
            WorkflowStatus::OnlineAssessmentInProgress,
            &WorkflowEvent::AssessmentComplete {
                assessment_type: AssessmentType::Onsite,
                passed: true,
            },
            &ctx(UserRole::Auditor),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
    }

    #[test]
    fn test_failed_assessment_applies_revision_policy() {
        let context = TransitionContext::new(UserRole::Auditor, 3, RevisionPolicy::default());
        let outcome = transition(
            WorkflowStatus::OnsiteAssessmentCompleted,
            &WorkflowEvent::AssessmentComplete {
                assessment_type: AssessmentType::Onsite,
                passed: false,
            },
            &context,
        )
        .unwrap();
        assert_eq!(outcome.to, WorkflowStatus::RejectedPaymentRequired);
        assert_eq!(outcome.revision_count, 4);
    }

    #[test]
    fn test_draft_cannot_be_revoked() {
        assert!(!can_apply(
            WorkflowStatus::Draft,
            &WorkflowEvent::Revoke,
            &ctx(UserRole::Admin)
        ));
        assert!(can_apply(
            WorkflowStatus::UnderReview,
            &WorkflowEvent::Revoke,
            &ctx(UserRole::Admin)
        ));
    }

    #[test]
    fn test_transition_raw_rejects_unknown_status() {
        let err = transition_raw("PENDING", &WorkflowEvent::Submit, &ctx(UserRole::Applicant))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::CorruptState(_)));
    }
}
