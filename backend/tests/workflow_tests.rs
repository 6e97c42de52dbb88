//! Workflow transition tests
//!
//! Property-based and unit tests for:
//! - Property 1: Status Classification Totality
//! - Property 4: Terminal Status Immutability
//! - Property 5: Review Rejection Within Free Revisions
//! - Property 6: Passed Assessment Certifies
//! - Property 8: Role Enforcement
//! - Property 9: Payment Confirmation Requires Settled Receipt

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    transition, transition_raw, AssessmentType, Milestone, PaymentReceipt, PaymentStatus,
    RevisionPolicy, TransitionContext, UserRole, WorkflowError, WorkflowEvent, WorkflowStatus,
    ASSESSMENT_FEE, DOCUMENT_REVIEW_FEE,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

fn status_strategy() -> impl Strategy<Value = WorkflowStatus> {
    proptest::sample::select(WorkflowStatus::ALL.to_vec())
}

fn terminal_status_strategy() -> impl Strategy<Value = WorkflowStatus> {
    prop_oneof![
        Just(WorkflowStatus::Certified),
        Just(WorkflowStatus::Rejected),
        Just(WorkflowStatus::Expired),
        Just(WorkflowStatus::Revoked),
    ]
}

fn role_strategy() -> impl Strategy<Value = UserRole> {
    prop_oneof![
        Just(UserRole::Applicant),
        Just(UserRole::Reviewer),
        Just(UserRole::Auditor),
        Just(UserRole::Admin),
        Just(UserRole::System),
    ]
}

fn assessment_type_strategy() -> impl Strategy<Value = AssessmentType> {
    prop_oneof![Just(AssessmentType::Online), Just(AssessmentType::Onsite)]
}

fn milestone_strategy() -> impl Strategy<Value = Milestone> {
    prop_oneof![
        Just(Milestone::DocumentReview),
        Just(Milestone::Assessment),
        Just(Milestone::CertificateIssuance),
    ]
}

fn payment_status_strategy() -> impl Strategy<Value = PaymentStatus> {
    prop_oneof![
        Just(PaymentStatus::Pending),
        Just(PaymentStatus::Completed),
        Just(PaymentStatus::Failed),
        Just(PaymentStatus::Cancelled),
    ]
}

fn receipt_strategy() -> impl Strategy<Value = PaymentReceipt> {
    (milestone_strategy(), payment_status_strategy(), 0i64..40_000).prop_map(
        |(milestone, status, amount)| PaymentReceipt {
            milestone,
            status,
            amount: Decimal::from(amount),
        },
    )
}

fn event_strategy() -> impl Strategy<Value = WorkflowEvent> {
    prop_oneof![
        Just(WorkflowEvent::Submit),
        milestone_strategy().prop_map(|milestone| WorkflowEvent::PaymentRequested { milestone }),
        receipt_strategy().prop_map(|receipt| WorkflowEvent::PaymentConfirmed { receipt }),
        Just(WorkflowEvent::ReviewStart),
        Just(WorkflowEvent::ReviewApprove),
        Just(WorkflowEvent::ReviewReject),
        Just(WorkflowEvent::Reject),
        assessment_type_strategy()
            .prop_map(|assessment_type| WorkflowEvent::AssessmentSchedule { assessment_type }),
        Just(WorkflowEvent::AssessmentStart),
        Just(WorkflowEvent::AssessmentReportFiled),
        (assessment_type_strategy(), any::<bool>()).prop_map(|(assessment_type, passed)| {
            WorkflowEvent::AssessmentComplete {
                assessment_type,
                passed,
            }
        }),
        Just(WorkflowEvent::Expire),
        Just(WorkflowEvent::Revoke),
    ]
}

fn context(role: UserRole, revision_count: u32) -> TransitionContext {
    TransitionContext::new(role, revision_count, RevisionPolicy::default())
}

fn paid(milestone: Milestone) -> WorkflowEvent {
    let amount = match milestone {
        Milestone::DocumentReview => DOCUMENT_REVIEW_FEE,
        Milestone::Assessment => ASSESSMENT_FEE,
        Milestone::CertificateIssuance => Decimal::ZERO,
    };
    WorkflowEvent::PaymentConfirmed {
        receipt: PaymentReceipt {
            milestone,
            status: PaymentStatus::Completed,
            amount,
        },
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: Status Classification Totality
    /// Every status is classified without panicking, and a gated status is
    /// never terminal.
    #[test]
    fn test_status_classification_is_total(status in status_strategy()) {
        let terminal = status.is_terminal();
        let milestone = status.payment_milestone();
        prop_assert_eq!(terminal, shared::is_terminal(status));
        prop_assert_eq!(milestone, shared::is_payment_gated(status));
        prop_assert!(!(terminal && milestone.is_some()));
    }

    /// Property 4: Terminal Status Immutability
    /// No event, from any role, moves an application out of a terminal status.
    #[test]
    fn test_terminal_status_rejects_every_event(
        status in terminal_status_strategy(),
        event in event_strategy(),
        role in role_strategy(),
        revision_count in 0u32..10,
    ) {
        let result = transition(status, &event, &context(role, revision_count));
        let is_invalid_transition = matches!(
            result,
            Err(WorkflowError::InvalidTransition { from, .. }) if from == status
        );
        prop_assert!(is_invalid_transition);
    }

    /// Property 8: Role Enforcement
    /// An event raised by a role outside its allowed set never succeeds.
    #[test]
    fn test_wrong_role_never_transitions(
        status in status_strategy(),
        event in event_strategy(),
        role in role_strategy(),
    ) {
        prop_assume!(!event.is_permitted_for(role));
        let result = transition(status, &event, &context(role, 0));
        prop_assert!(result.is_err());
    }

    /// Property 9: Payment Confirmation Requires Settled Receipt
    #[test]
    fn test_unsettled_receipt_never_confirms(
        status in status_strategy(),
        receipt in receipt_strategy(),
    ) {
        prop_assume!(!receipt.is_settled_in_full());
        let event = WorkflowEvent::PaymentConfirmed { receipt };
        let result = transition(status, &event, &context(UserRole::System, 0));
        prop_assert!(result.is_err());
    }

    /// Successful transitions only ever come from non-terminal statuses and
    /// carry the starting status in the outcome.
    #[test]
    fn test_outcome_records_origin(
        status in status_strategy(),
        event in event_strategy(),
        role in role_strategy(),
        revision_count in 0u32..10,
    ) {
        if let Ok(outcome) = transition(status, &event, &context(role, revision_count)) {
            prop_assert_eq!(outcome.from, status);
            prop_assert_eq!(outcome.event, event);
            prop_assert!(!status.is_terminal());
            prop_assert!(outcome.revision_count >= revision_count);
        }
    }

    /// Property 6: Passed Assessment Certifies
    #[test]
    fn test_passed_assessment_certifies(
        assessment_type in assessment_type_strategy(),
        in_progress in any::<bool>(),
        revision_count in 0u32..10,
    ) {
        let phase = if in_progress {
            shared::AssessmentPhase::InProgress
        } else {
            shared::AssessmentPhase::Completed
        };
        let status = WorkflowStatus::for_assessment(assessment_type, phase);
        let event = WorkflowEvent::AssessmentComplete { assessment_type, passed: true };
        let outcome = transition(status, &event, &context(UserRole::Auditor, revision_count));
        prop_assert_eq!(outcome.map(|o| o.to), Ok(WorkflowStatus::Certified));
    }
}

// ============================================================================
// Unit Tests: Transition Table
// ============================================================================

mod transition_table {
    use super::*;

    #[test]
    fn under_review_rejection_requests_revision() {
        // Property 5: first rejection with three free revisions
        let ctx = TransitionContext::new(UserRole::Reviewer, 0, RevisionPolicy::new(3));
        let outcome =
            transition(WorkflowStatus::UnderReview, &WorkflowEvent::ReviewReject, &ctx).unwrap();
        assert_eq!(outcome.to, WorkflowStatus::RevisionRequested);
        assert_eq!(outcome.revision_count, 1);
    }

    #[test]
    fn onsite_completed_pass_is_certified() {
        let event = WorkflowEvent::AssessmentComplete {
            assessment_type: AssessmentType::Onsite,
            passed: true,
        };
        let outcome = transition(
            WorkflowStatus::OnsiteAssessmentCompleted,
            &event,
            &context(UserRole::Auditor, 0),
        )
        .unwrap();
        assert_eq!(outcome.to, WorkflowStatus::Certified);
    }

    #[test]
    fn failed_assessment_goes_through_revision_policy() {
        let event = WorkflowEvent::AssessmentComplete {
            assessment_type: AssessmentType::Online,
            passed: false,
        };
        let first = transition(
            WorkflowStatus::OnlineAssessmentCompleted,
            &event,
            &context(UserRole::Auditor, 0),
        )
        .unwrap();
        assert_eq!(first.to, WorkflowStatus::RevisionRequested);

        let exhausted = transition(
            WorkflowStatus::OnlineAssessmentCompleted,
            &event,
            &context(UserRole::Auditor, 3),
        )
        .unwrap();
        assert_eq!(exhausted.to, WorkflowStatus::RejectedPaymentRequired);
        assert_eq!(exhausted.revision_count, 4);
    }

    #[test]
    fn assessment_type_mismatch_is_invalid() {
        let event = WorkflowEvent::AssessmentComplete {
            assessment_type: AssessmentType::Online,
            passed: true,
        };
        let result = transition(
            WorkflowStatus::OnsiteAssessmentInProgress,
            &event,
            &context(UserRole::Auditor, 0),
        );
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn short_payment_is_not_completed() {
        let event = WorkflowEvent::PaymentConfirmed {
            receipt: PaymentReceipt {
                milestone: Milestone::DocumentReview,
                status: PaymentStatus::Completed,
                amount: Decimal::from(4999),
            },
        };
        let result = transition(
            WorkflowStatus::PaymentPendingReview,
            &event,
            &context(UserRole::System, 0),
        );
        assert_eq!(
            result,
            Err(WorkflowError::PaymentNotCompleted {
                milestone: Milestone::DocumentReview
            })
        );
    }

    #[test]
    fn failed_payment_is_not_completed() {
        let event = WorkflowEvent::PaymentConfirmed {
            receipt: PaymentReceipt {
                milestone: Milestone::Assessment,
                status: PaymentStatus::Failed,
                amount: ASSESSMENT_FEE,
            },
        };
        let result = transition(
            WorkflowStatus::PaymentPendingAssessment,
            &event,
            &context(UserRole::System, 0),
        );
        assert!(matches!(result, Err(WorkflowError::PaymentNotCompleted { .. })));
    }

    #[test]
    fn receipt_for_wrong_milestone_is_invalid() {
        let result = transition(
            WorkflowStatus::PaymentPendingReview,
            &paid(Milestone::Assessment),
            &context(UserRole::System, 0),
        );
        assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
    }

    #[test]
    fn applicant_cannot_approve() {
        let result = transition(
            WorkflowStatus::UnderReview,
            &WorkflowEvent::ReviewApprove,
            &context(UserRole::Applicant, 0),
        );
        assert_eq!(
            result,
            Err(WorkflowError::NotPermitted {
                role: UserRole::Applicant,
                event: "REVIEW_APPROVE"
            })
        );
    }

    #[test]
    fn draft_cannot_be_rejected_or_revoked() {
        for event in [WorkflowEvent::Reject, WorkflowEvent::Revoke, WorkflowEvent::Expire] {
            let result = transition(WorkflowStatus::Draft, &event, &context(UserRole::Admin, 0));
            assert!(matches!(result, Err(WorkflowError::InvalidTransition { .. })));
        }
    }

    #[test]
    fn revoke_from_active_status() {
        let outcome = transition(
            WorkflowStatus::UnderReview,
            &WorkflowEvent::Revoke,
            &context(UserRole::Admin, 0),
        )
        .unwrap();
        assert_eq!(outcome.to, WorkflowStatus::Revoked);
    }

    #[test]
    fn resubmission_after_revision_returns_to_review() {
        let outcome = transition(
            WorkflowStatus::RevisionRequested,
            &WorkflowEvent::Submit,
            &context(UserRole::Applicant, 2),
        )
        .unwrap();
        assert_eq!(outcome.to, WorkflowStatus::UnderReview);
        assert_eq!(outcome.revision_count, 2);
    }

    #[test]
    fn paid_resubmission_returns_to_review_queue() {
        let outcome = transition(
            WorkflowStatus::RejectedPaymentRequired,
            &paid(Milestone::DocumentReview),
            &context(UserRole::System, 4),
        )
        .unwrap();
        assert_eq!(outcome.to, WorkflowStatus::PaymentConfirmedReview);
        assert_eq!(outcome.revision_count, 4);
    }

    #[test]
    fn raw_status_must_parse() {
        let result = transition_raw(
            "UNDER_REVIEW_V2",
            &WorkflowEvent::ReviewApprove,
            &context(UserRole::Reviewer, 0),
        );
        assert!(matches!(result, Err(WorkflowError::CorruptState(_))));
    }
}

// ============================================================================
// Unit Tests: Full Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    fn step(
        status: WorkflowStatus,
        event: WorkflowEvent,
        role: UserRole,
        revision_count: u32,
    ) -> (WorkflowStatus, u32) {
        let outcome = transition(status, &event, &context(role, revision_count))
            .unwrap_or_else(|e| panic!("{} from {} failed: {}", event.name(), status, e));
        (outcome.to, outcome.revision_count)
    }

    #[test]
    fn happy_path_to_certification() {
        let mut state = (WorkflowStatus::Draft, 0);
        let steps = [
            (WorkflowEvent::Submit, UserRole::Applicant, WorkflowStatus::Submitted),
            (
                WorkflowEvent::PaymentRequested { milestone: Milestone::DocumentReview },
                UserRole::System,
                WorkflowStatus::PaymentPendingReview,
            ),
            (paid(Milestone::DocumentReview), UserRole::System, WorkflowStatus::PaymentConfirmedReview),
            (WorkflowEvent::ReviewStart, UserRole::Reviewer, WorkflowStatus::UnderReview),
            (WorkflowEvent::ReviewApprove, UserRole::Reviewer, WorkflowStatus::ReviewApproved),
            (
                WorkflowEvent::PaymentRequested { milestone: Milestone::Assessment },
                UserRole::System,
                WorkflowStatus::PaymentPendingAssessment,
            ),
            (paid(Milestone::Assessment), UserRole::System, WorkflowStatus::PaymentConfirmedAssessment),
            (
                WorkflowEvent::AssessmentSchedule { assessment_type: AssessmentType::Onsite },
                UserRole::Auditor,
                WorkflowStatus::OnsiteAssessmentScheduled,
            ),
            (WorkflowEvent::AssessmentStart, UserRole::Auditor, WorkflowStatus::OnsiteAssessmentInProgress),
            (
                WorkflowEvent::AssessmentReportFiled,
                UserRole::Auditor,
                WorkflowStatus::OnsiteAssessmentCompleted,
            ),
            (
                WorkflowEvent::AssessmentComplete {
                    assessment_type: AssessmentType::Onsite,
                    passed: true,
                },
                UserRole::Auditor,
                WorkflowStatus::Certified,
            ),
        ];

        for (event, role, expected) in steps {
            state = step(state.0, event, role, state.1);
            assert_eq!(state.0, expected);
        }
        assert_eq!(state.1, 0);
    }

    #[test]
    fn four_rejections_require_payment() {
        let mut state = (WorkflowStatus::UnderReview, 0);
        for expected_count in 1..=3 {
            state = step(state.0, WorkflowEvent::ReviewReject, UserRole::Reviewer, state.1);
            assert_eq!(state, (WorkflowStatus::RevisionRequested, expected_count));
            state = step(state.0, WorkflowEvent::Submit, UserRole::Applicant, state.1);
            assert_eq!(state.0, WorkflowStatus::UnderReview);
        }

        state = step(state.0, WorkflowEvent::ReviewReject, UserRole::Reviewer, state.1);
        assert_eq!(state, (WorkflowStatus::RejectedPaymentRequired, 4));

        let gate = shared::evaluate_payment_gate(state.0, state.1).unwrap();
        assert_eq!(gate.amount, DOCUMENT_REVIEW_FEE);
    }
}
