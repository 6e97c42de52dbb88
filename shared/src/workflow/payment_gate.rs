//! Payment gate evaluator
//!
//! Decides which milestone payment, if any, an application owes before it
//! can move on. Queried repeatedly by the presentation layer, so it must stay
//! pure and total over [`WorkflowStatus`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Milestone, ASSESSMENT_FEE, DOCUMENT_REVIEW_FEE};

use super::status::WorkflowStatus;

/// How prominently the presentation layer should surface a payment prompt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Medium,
    High,
}

/// A payment the applicant must make to proceed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentGate {
    pub milestone: Milestone,
    pub amount: Decimal,
    pub description: String,
    pub description_th: String,
    pub urgency: Urgency,
}

/// Evaluate the payment required in `status` for an application that has
/// been rejected `revision_count` times.
pub fn evaluate_payment_gate(status: WorkflowStatus, revision_count: u32) -> Option<PaymentGate> {
    match status {
        WorkflowStatus::Submitted | WorkflowStatus::PaymentPendingReview => Some(PaymentGate {
            milestone: Milestone::DocumentReview,
            amount: DOCUMENT_REVIEW_FEE,
            description: Milestone::DocumentReview.display_name().to_string(),
            description_th: Milestone::DocumentReview.display_name_th().to_string(),
            urgency: Urgency::Medium,
        }),
        WorkflowStatus::RejectedPaymentRequired => Some(PaymentGate {
            milestone: Milestone::DocumentReview,
            amount: DOCUMENT_REVIEW_FEE,
            description: format!(
                "Document review fee after {} rejections; free revisions are used up",
                revision_count
            ),
            description_th: format!(
                "ค่าตรวจสอบเอกสารใหม่ หลังถูกปฏิเสธ {} ครั้ง (ใช้สิทธิ์แก้ไขฟรีครบแล้ว)",
                revision_count
            ),
            urgency: Urgency::High,
        }),
        WorkflowStatus::ReviewApproved | WorkflowStatus::PaymentPendingAssessment => {
            Some(PaymentGate {
                milestone: Milestone::Assessment,
                amount: ASSESSMENT_FEE,
                description: Milestone::Assessment.display_name().to_string(),
                description_th: Milestone::Assessment.display_name_th().to_string(),
                urgency: Urgency::Medium,
            })
        }
        WorkflowStatus::Draft
        | WorkflowStatus::PaymentConfirmedReview
        | WorkflowStatus::UnderReview
        | WorkflowStatus::RevisionRequested
        | WorkflowStatus::PaymentConfirmedAssessment
        | WorkflowStatus::OnlineAssessmentScheduled
        | WorkflowStatus::OnlineAssessmentInProgress
        | WorkflowStatus::OnlineAssessmentCompleted
        | WorkflowStatus::OnsiteAssessmentScheduled
        | WorkflowStatus::OnsiteAssessmentInProgress
        | WorkflowStatus::OnsiteAssessmentCompleted
        | WorkflowStatus::Certified
        | WorkflowStatus::Rejected
        | WorkflowStatus::Expired
        | WorkflowStatus::Revoked => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_agrees_with_status_model() {
        for status in WorkflowStatus::ALL {
            let gate = evaluate_payment_gate(status, 0);
            assert_eq!(gate.map(|g| g.milestone), status.payment_milestone());
        }
    }

    #[test]
    fn test_rejection_gate_mentions_revision_count() {
        let gate = evaluate_payment_gate(WorkflowStatus::RejectedPaymentRequired, 4).unwrap();
        assert_eq!(gate.urgency, Urgency::High);
        assert_eq!(gate.amount, Decimal::from(5000));
        assert!(gate.description.contains('4'));
        assert!(gate.description_th.contains('4'));
    }

    #[test]
    fn test_gate_is_idempotent() {
        let first = evaluate_payment_gate(WorkflowStatus::ReviewApproved, 2);
        let second = evaluate_payment_gate(WorkflowStatus::ReviewApproved, 2);
        assert_eq!(first, second);
    }
}
