//! Certification application models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Language;
use crate::workflow::{RevisionPolicy, WorkflowStatus};

/// Application number in the form `GACP-NNNN-NNNN`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApplicationNumber(String);

/// Highest sequence one intake year can issue
pub const MAX_YEARLY_SEQUENCE: u32 = 9_999;

impl ApplicationNumber {
    /// Build a number from the intake year and that year's sequence, starting
    /// at 1. `None` when either block does not fit in four digits.
    pub fn new(year: u16, sequence: u32) -> Option<Self> {
        if year > 9_999 || sequence == 0 || sequence > MAX_YEARLY_SEQUENCE {
            return None;
        }
        Some(Self(format!("GACP-{:04}-{:04}", year, sequence)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for ApplicationNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::validation::validate_application_number(s)?;
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ApplicationNumber {
    type Error = &'static str;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        crate::validation::validate_application_number(&value)?;
        Ok(Self(value))
    }
}

impl From<ApplicationNumber> for String {
    fn from(number: ApplicationNumber) -> Self {
        number.0
    }
}

impl std::fmt::Display for ApplicationNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse outcome of an application, derived from its workflow status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Draft,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Certified,
    Expired,
    Revoked,
}

impl From<WorkflowStatus> for ApplicationStatus {
    fn from(status: WorkflowStatus) -> Self {
        use WorkflowStatus::*;
        match status {
            Draft => ApplicationStatus::Draft,
            Submitted | PaymentPendingReview | PaymentConfirmedReview => {
                ApplicationStatus::Submitted
            }
            UnderReview | RevisionRequested | RejectedPaymentRequired => {
                ApplicationStatus::UnderReview
            }
            ReviewApproved
            | PaymentPendingAssessment
            | PaymentConfirmedAssessment
            | OnlineAssessmentScheduled
            | OnlineAssessmentInProgress
            | OnlineAssessmentCompleted
            | OnsiteAssessmentScheduled
            | OnsiteAssessmentInProgress
            | OnsiteAssessmentCompleted => ApplicationStatus::Approved,
            Certified => ApplicationStatus::Certified,
            Rejected => ApplicationStatus::Rejected,
            Expired => ApplicationStatus::Expired,
            Revoked => ApplicationStatus::Revoked,
        }
    }
}

/// Cultivation method declared by the applicant
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CultivationMethod {
    Outdoor,
    Greenhouse,
    Indoor,
}

/// Farm and crop metadata. Descriptive only, the workflow never reads it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmDetails {
    pub farm_name: String,
    pub province: String,
    pub area_rai: Decimal,
    pub crop: String,
    pub strain: Option<String>,
    pub cultivation_method: CultivationMethod,
}

/// One certification request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub application_number: ApplicationNumber,
    pub applicant_id: Uuid,
    pub product_id: Uuid,
    pub status: ApplicationStatus,
    pub workflow_status: WorkflowStatus,
    pub revision_count: u32,
    pub max_free_revisions: u32,
    pub farm: FarmDetails,
    /// Language the applicant receives notifications in
    pub applicant_language: Language,
    /// Optimistic concurrency token, bumped on every write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Revision policy recorded on this application
    pub fn revision_policy(&self) -> RevisionPolicy {
        RevisionPolicy::new(self.max_free_revisions)
    }

    pub fn is_terminal(&self) -> bool {
        self.workflow_status.is_terminal()
    }

    /// Relative URL of the application's page in the frontend
    pub fn action_url(&self) -> String {
        format!("/applications/{}", self.id)
    }
}
