//! Notification intent models
//!
//! The workflow emits intents; delivery (LINE, email, in-app) belongs to the
//! notification collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of workflow notification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    PaymentRequired,
    ReviewStarted,
    RevisionRequested,
    ReviewApproved,
    AssessmentScheduled,
    Certified,
    Rejected,
    StatusChanged,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::PaymentRequired => "PAYMENT_REQUIRED",
            NotificationType::ReviewStarted => "REVIEW_STARTED",
            NotificationType::RevisionRequested => "REVISION_REQUESTED",
            NotificationType::ReviewApproved => "REVIEW_APPROVED",
            NotificationType::AssessmentScheduled => "ASSESSMENT_SCHEDULED",
            NotificationType::Certified => "CERTIFIED",
            NotificationType::Rejected => "REJECTED",
            NotificationType::StatusChanged => "STATUS_CHANGED",
        }
    }
}

impl std::str::FromStr for NotificationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PAYMENT_REQUIRED" => Ok(NotificationType::PaymentRequired),
            "REVIEW_STARTED" => Ok(NotificationType::ReviewStarted),
            "REVISION_REQUESTED" => Ok(NotificationType::RevisionRequested),
            "REVIEW_APPROVED" => Ok(NotificationType::ReviewApproved),
            "ASSESSMENT_SCHEDULED" => Ok(NotificationType::AssessmentScheduled),
            "CERTIFIED" => Ok(NotificationType::Certified),
            "REJECTED" => Ok(NotificationType::Rejected),
            "STATUS_CHANGED" => Ok(NotificationType::StatusChanged),
            other => Err(format!("unknown notification type: {}", other)),
        }
    }
}

/// A notification the collaborator should deliver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationIntent {
    pub user_id: Uuid,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub action_url: String,
}
