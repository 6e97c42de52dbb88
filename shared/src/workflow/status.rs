//! Workflow status model

use serde::{Deserialize, Serialize};

use crate::models::{AssessmentType, Milestone};
use crate::types::Language;

use super::error::WorkflowError;

/// Fine-grained position of an application in the review, payment and
/// assessment pipeline. The set is closed; stored values outside it are
/// corrupt state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkflowStatus {
    Draft,
    Submitted,
    PaymentPendingReview,
    PaymentConfirmedReview,
    UnderReview,
    RevisionRequested,
    ReviewApproved,
    RejectedPaymentRequired,
    PaymentPendingAssessment,
    PaymentConfirmedAssessment,
    OnlineAssessmentScheduled,
    OnlineAssessmentInProgress,
    OnlineAssessmentCompleted,
    OnsiteAssessmentScheduled,
    OnsiteAssessmentInProgress,
    OnsiteAssessmentCompleted,
    Certified,
    Rejected,
    Expired,
    Revoked,
}

/// Assessment track phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentPhase {
    Scheduled,
    InProgress,
    Completed,
}

impl WorkflowStatus {
    /// Every member, in logical progression order
    pub const ALL: [WorkflowStatus; 20] = [
        WorkflowStatus::Draft,
        WorkflowStatus::Submitted,
        WorkflowStatus::PaymentPendingReview,
        WorkflowStatus::PaymentConfirmedReview,
        WorkflowStatus::UnderReview,
        WorkflowStatus::RevisionRequested,
        WorkflowStatus::ReviewApproved,
        WorkflowStatus::RejectedPaymentRequired,
        WorkflowStatus::PaymentPendingAssessment,
        WorkflowStatus::PaymentConfirmedAssessment,
        WorkflowStatus::OnlineAssessmentScheduled,
        WorkflowStatus::OnlineAssessmentInProgress,
        WorkflowStatus::OnlineAssessmentCompleted,
        WorkflowStatus::OnsiteAssessmentScheduled,
        WorkflowStatus::OnsiteAssessmentInProgress,
        WorkflowStatus::OnsiteAssessmentCompleted,
        WorkflowStatus::Certified,
        WorkflowStatus::Rejected,
        WorkflowStatus::Expired,
        WorkflowStatus::Revoked,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Draft => "DRAFT",
            WorkflowStatus::Submitted => "SUBMITTED",
            WorkflowStatus::PaymentPendingReview => "PAYMENT_PENDING_REVIEW",
            WorkflowStatus::PaymentConfirmedReview => "PAYMENT_CONFIRMED_REVIEW",
            WorkflowStatus::UnderReview => "UNDER_REVIEW",
            WorkflowStatus::RevisionRequested => "REVISION_REQUESTED",
            WorkflowStatus::ReviewApproved => "REVIEW_APPROVED",
            WorkflowStatus::RejectedPaymentRequired => "REJECTED_PAYMENT_REQUIRED",
            WorkflowStatus::PaymentPendingAssessment => "PAYMENT_PENDING_ASSESSMENT",
            WorkflowStatus::PaymentConfirmedAssessment => "PAYMENT_CONFIRMED_ASSESSMENT",
            WorkflowStatus::OnlineAssessmentScheduled => "ONLINE_ASSESSMENT_SCHEDULED",
            WorkflowStatus::OnlineAssessmentInProgress => "ONLINE_ASSESSMENT_IN_PROGRESS",
            WorkflowStatus::OnlineAssessmentCompleted => "ONLINE_ASSESSMENT_COMPLETED",
            WorkflowStatus::OnsiteAssessmentScheduled => "ONSITE_ASSESSMENT_SCHEDULED",
            WorkflowStatus::OnsiteAssessmentInProgress => "ONSITE_ASSESSMENT_IN_PROGRESS",
            WorkflowStatus::OnsiteAssessmentCompleted => "ONSITE_ASSESSMENT_COMPLETED",
            WorkflowStatus::Certified => "CERTIFIED",
            WorkflowStatus::Rejected => "REJECTED",
            WorkflowStatus::Expired => "EXPIRED",
            WorkflowStatus::Revoked => "REVOKED",
        }
    }

    /// No transition leaves a terminal status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::Certified
                | WorkflowStatus::Rejected
                | WorkflowStatus::Expired
                | WorkflowStatus::Revoked
        )
    }

    /// Milestone whose payment must complete before the application can
    /// leave this status
    pub fn payment_milestone(&self) -> Option<Milestone> {
        match self {
            WorkflowStatus::Submitted
            | WorkflowStatus::PaymentPendingReview
            | WorkflowStatus::RejectedPaymentRequired => Some(Milestone::DocumentReview),
            WorkflowStatus::ReviewApproved | WorkflowStatus::PaymentPendingAssessment => {
                Some(Milestone::Assessment)
            }
            _ => None,
        }
    }

    /// Assessment track and phase, for the assessment statuses only
    pub fn assessment(&self) -> Option<(AssessmentType, AssessmentPhase)> {
        use AssessmentPhase::*;
        use AssessmentType::*;
        match self {
            WorkflowStatus::OnlineAssessmentScheduled => Some((Online, Scheduled)),
            WorkflowStatus::OnlineAssessmentInProgress => Some((Online, InProgress)),
            WorkflowStatus::OnlineAssessmentCompleted => Some((Online, Completed)),
            WorkflowStatus::OnsiteAssessmentScheduled => Some((Onsite, Scheduled)),
            WorkflowStatus::OnsiteAssessmentInProgress => Some((Onsite, InProgress)),
            WorkflowStatus::OnsiteAssessmentCompleted => Some((Onsite, Completed)),
            _ => None,
        }
    }

    /// The assessment status for a track and phase
    pub fn for_assessment(assessment_type: AssessmentType, phase: AssessmentPhase) -> Self {
        match (assessment_type, phase) {
            (AssessmentType::Online, AssessmentPhase::Scheduled) => {
                WorkflowStatus::OnlineAssessmentScheduled
            }
            (AssessmentType::Online, AssessmentPhase::InProgress) => {
                WorkflowStatus::OnlineAssessmentInProgress
            }
            (AssessmentType::Online, AssessmentPhase::Completed) => {
                WorkflowStatus::OnlineAssessmentCompleted
            }
            (AssessmentType::Onsite, AssessmentPhase::Scheduled) => {
                WorkflowStatus::OnsiteAssessmentScheduled
            }
            (AssessmentType::Onsite, AssessmentPhase::InProgress) => {
                WorkflowStatus::OnsiteAssessmentInProgress
            }
            (AssessmentType::Onsite, AssessmentPhase::Completed) => {
                WorkflowStatus::OnsiteAssessmentCompleted
            }
        }
    }

    /// Human readable label for the presentation layer
    pub fn label(&self, language: Language) -> &'static str {
        let (en, th) = match self {
            WorkflowStatus::Draft => ("Draft", "ฉบับร่าง"),
            WorkflowStatus::Submitted => ("Submitted", "ยื่นคำขอแล้ว"),
            WorkflowStatus::PaymentPendingReview => {
                ("Awaiting review fee", "รอชำระค่าตรวจสอบเอกสาร")
            }
            WorkflowStatus::PaymentConfirmedReview => {
                ("Review fee received", "ชำระค่าตรวจสอบเอกสารแล้ว")
            }
            WorkflowStatus::UnderReview => ("Under review", "อยู่ระหว่างตรวจสอบเอกสาร"),
            WorkflowStatus::RevisionRequested => ("Revision requested", "ขอให้แก้ไขเอกสาร"),
            WorkflowStatus::ReviewApproved => ("Documents approved", "เอกสารผ่านการตรวจสอบ"),
            WorkflowStatus::RejectedPaymentRequired => {
                ("Rejected, payment required", "ไม่ผ่าน ต้องชำระค่าธรรมเนียมใหม่")
            }
            WorkflowStatus::PaymentPendingAssessment => {
                ("Awaiting assessment fee", "รอชำระค่าตรวจประเมิน")
            }
            WorkflowStatus::PaymentConfirmedAssessment => {
                ("Assessment fee received", "ชำระค่าตรวจประเมินแล้ว")
            }
            WorkflowStatus::OnlineAssessmentScheduled => {
                ("Online assessment scheduled", "นัดหมายตรวจประเมินออนไลน์แล้ว")
            }
            WorkflowStatus::OnlineAssessmentInProgress => {
                ("Online assessment in progress", "กำลังตรวจประเมินออนไลน์")
            }
            WorkflowStatus::OnlineAssessmentCompleted => {
                ("Online assessment completed", "ตรวจประเมินออนไลน์เสร็จสิ้น")
            }
            WorkflowStatus::OnsiteAssessmentScheduled => {
                ("Onsite assessment scheduled", "นัดหมายตรวจประเมิน ณ สถานที่แล้ว")
            }
            WorkflowStatus::OnsiteAssessmentInProgress => {
                ("Onsite assessment in progress", "กำลังตรวจประเมิน ณ สถานที่")
            }
            WorkflowStatus::OnsiteAssessmentCompleted => {
                ("Onsite assessment completed", "ตรวจประเมิน ณ สถานที่เสร็จสิ้น")
            }
            WorkflowStatus::Certified => ("Certified", "ได้รับการรับรอง"),
            WorkflowStatus::Rejected => ("Rejected", "ไม่ผ่านการพิจารณา"),
            WorkflowStatus::Expired => ("Expired", "หมดอายุ"),
            WorkflowStatus::Revoked => ("Revoked", "ถูกเพิกถอน"),
        };
        language.pick(en, th)
    }
}

/// Free-function form of [`WorkflowStatus::is_terminal`]
pub fn is_terminal(status: WorkflowStatus) -> bool {
    status.is_terminal()
}

/// Free-function form of [`WorkflowStatus::payment_milestone`]
pub fn is_payment_gated(status: WorkflowStatus) -> Option<Milestone> {
    status.payment_milestone()
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for WorkflowStatus {
    type Err = WorkflowError;

    /// Exact match only. Unknown values are never coerced to a default.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkflowStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| WorkflowError::CorruptState(format!("unknown workflow status '{}'", s)))
    }
}
