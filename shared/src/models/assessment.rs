//! Assessment models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Pass mark used when an auditor records a score without a verdict
pub const DEFAULT_PASS_SCORE: Decimal = Decimal::from_parts(80, 0, 0, false, 0);

/// How the assessment is carried out
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentType {
    Online,
    Onsite,
}

impl AssessmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentType::Online => "ONLINE",
            AssessmentType::Onsite => "ONSITE",
        }
    }
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AssessmentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ONLINE" => Ok(AssessmentType::Online),
            "ONSITE" => Ok(AssessmentType::Onsite),
            other => Err(format!("unknown assessment type: {}", other)),
        }
    }
}

/// Status of an assessment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssessmentStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl AssessmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssessmentStatus::Scheduled => "SCHEDULED",
            AssessmentStatus::InProgress => "IN_PROGRESS",
            AssessmentStatus::Completed => "COMPLETED",
            AssessmentStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::str::FromStr for AssessmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SCHEDULED" => Ok(AssessmentStatus::Scheduled),
            "IN_PROGRESS" => Ok(AssessmentStatus::InProgress),
            "COMPLETED" => Ok(AssessmentStatus::Completed),
            "CANCELLED" => Ok(AssessmentStatus::Cancelled),
            other => Err(format!("unknown assessment status: {}", other)),
        }
    }
}

/// An assessment produced by an auditor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub application_id: Uuid,
    pub auditor_id: Uuid,
    pub assessment_type: AssessmentType,
    pub status: AssessmentStatus,
    pub scheduled_at: DateTime<Utc>,
    pub passed: Option<bool>,
    pub score: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Assessment {
    /// The verdict, defined only once the assessment is completed
    pub fn outcome(&self) -> Option<bool> {
        match self.status {
            AssessmentStatus::Completed => self.passed,
            _ => None,
        }
    }
}

/// Verdict for a score against a pass mark
pub fn passes_score(score: Decimal, pass_mark: Decimal) -> bool {
    score >= pass_mark
}
