//! Notification intents derived from transition outcomes

use crate::models::{Application, NotificationIntent, NotificationType};
use crate::types::Language;

use super::payment_gate::evaluate_payment_gate;
use super::status::{AssessmentPhase, WorkflowStatus};
use super::transition::TransitionOutcome;

/// Build the notifications a committed transition should trigger.
///
/// The applicant is told about every status change, in the language the
/// caller passes in.
pub fn notification_intents(
    application: &Application,
    outcome: &TransitionOutcome,
    language: Language,
) -> Vec<NotificationIntent> {
    let number = application.application_number.as_str();
    let gate = evaluate_payment_gate(outcome.to, outcome.revision_count);
    let action_url = match gate {
        Some(_) => format!("{}/payment", application.action_url()),
        None => application.action_url(),
    };

    let (notification_type, title, message) = match outcome.to {
        WorkflowStatus::ReviewApproved => (
            NotificationType::ReviewApproved,
            language.pick("Documents approved", "เอกสารผ่านการตรวจสอบ").to_string(),
            match language {
                Language::English => format!(
                    "Application {} passed document review. Please pay the assessment fee to continue.",
                    number
                ),
                Language::Thai => format!(
                    "คำขอ {} ผ่านการตรวจสอบเอกสารแล้ว กรุณาชำระค่าตรวจประเมินเพื่อดำเนินการต่อ",
                    number
                ),
            },
        ),
        WorkflowStatus::UnderReview => (
            NotificationType::ReviewStarted,
            language.pick("Review started", "เริ่มตรวจสอบเอกสาร").to_string(),
            match language {
                Language::English => format!("Application {} is now under review.", number),
                Language::Thai => format!("คำขอ {} อยู่ระหว่างการตรวจสอบเอกสาร", number),
            },
        ),
        WorkflowStatus::RevisionRequested => {
            let remaining = application
                .revision_policy()
                .free_revisions_remaining(outcome.revision_count);
            (
                NotificationType::RevisionRequested,
                language.pick("Revision requested", "ขอให้แก้ไขเอกสาร").to_string(),
                match language {
                    Language::English => format!(
                        "Application {} needs corrections ({} free revisions left).",
                        number, remaining
                    ),
                    Language::Thai => format!(
                        "คำขอ {} ต้องแก้ไขเอกสาร (เหลือสิทธิ์แก้ไขฟรี {} ครั้ง)",
                        number, remaining
                    ),
                },
            )
        }
        WorkflowStatus::Certified => (
            NotificationType::Certified,
            language.pick("Certified", "ได้รับการรับรองแล้ว").to_string(),
            match language {
                Language::English => format!("Application {} has been certified.", number),
                Language::Thai => format!("คำขอ {} ได้รับการรับรองมาตรฐาน GACP แล้ว", number),
            },
        ),
        WorkflowStatus::Rejected => (
            NotificationType::Rejected,
            language.pick("Application rejected", "คำขอไม่ผ่านการพิจารณา").to_string(),
            match language {
                Language::English => format!("Application {} was rejected.", number),
                Language::Thai => format!("คำขอ {} ไม่ผ่านการพิจารณา", number),
            },
        ),
        status if matches!(status.assessment(), Some((_, AssessmentPhase::Scheduled))) => (
            NotificationType::AssessmentScheduled,
            language.pick("Assessment scheduled", "นัดหมายตรวจประเมินแล้ว").to_string(),
            match language {
                Language::English => format!(
                    "An assessment has been scheduled for application {}.",
                    number
                ),
                Language::Thai => format!("คำขอ {} ได้รับการนัดหมายตรวจประเมินแล้ว", number),
            },
        ),
        status => match &gate {
            Some(gate) => (
                NotificationType::PaymentRequired,
                language.pick("Payment required", "กรุณาชำระค่าธรรมเนียม").to_string(),
                match language {
                    Language::English => format!(
                        "Application {}: {} of {} THB is due.",
                        number, gate.description, gate.amount
                    ),
                    Language::Thai => format!(
                        "คำขอ {}: {} จำนวน {} บาท",
                        number, gate.description_th, gate.amount
                    ),
                },
            ),
            None => (
                NotificationType::StatusChanged,
                language.pick("Status updated", "สถานะคำขอเปลี่ยนแปลง").to_string(),
                match language {
                    Language::English => format!(
                        "Application {} is now: {}.",
                        number,
                        status.label(language)
                    ),
                    Language::Thai => {
                        format!("คำขอ {} สถานะปัจจุบัน: {}", number, status.label(language))
                    }
                },
            ),
        },
    };

    vec![NotificationIntent {
        user_id: application.applicant_id,
        notification_type,
        title,
        message,
        action_url,
    }]
}
