//! Database models for the GACP Certification Platform
//!
//! Re-exports models from the shared crate and adds the row types read from
//! PostgreSQL. Enumerations are stored as TEXT and parsed on the way out, so
//! a value outside the closed set is reported as corrupt state instead of
//! being coerced.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use uuid::Uuid;

pub use shared::models::*;
use shared::{validate_revision_count, Language, WorkflowError, WorkflowStatus};

/// Raw `applications` row
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub application_number: String,
    pub applicant_id: Uuid,
    pub product_id: Uuid,
    pub workflow_status: String,
    pub revision_count: i32,
    pub max_free_revisions: i32,
    pub farm_name: String,
    pub province: String,
    pub area_rai: Decimal,
    pub crop: String,
    pub strain: Option<String>,
    pub cultivation_method: String,
    pub applicant_language: String,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns selected for [`ApplicationRow`]
pub const APPLICATION_COLUMNS: &str = "id, application_number, applicant_id, product_id, \
     workflow_status, revision_count, max_free_revisions, farm_name, province, area_rai, \
     crop, strain, cultivation_method, applicant_language, version, created_at, updated_at";

fn corrupt(what: &str, value: impl std::fmt::Display) -> WorkflowError {
    WorkflowError::CorruptState(format!("{} '{}'", what, value))
}

impl TryFrom<ApplicationRow> for Application {
    type Error = WorkflowError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let workflow_status: WorkflowStatus = row.workflow_status.parse()?;
        let application_number = row
            .application_number
            .parse::<ApplicationNumber>()
            .map_err(|_| corrupt("application number", &row.application_number))?;
        let cultivation_method = match row.cultivation_method.as_str() {
            "outdoor" => CultivationMethod::Outdoor,
            "greenhouse" => CultivationMethod::Greenhouse,
            "indoor" => CultivationMethod::Indoor,
            other => return Err(corrupt("cultivation method", other)),
        };

        Ok(Application {
            id: row.id,
            application_number,
            applicant_id: row.applicant_id,
            product_id: row.product_id,
            status: ApplicationStatus::from(workflow_status),
            workflow_status,
            revision_count: validate_revision_count(row.revision_count)?,
            max_free_revisions: u32::try_from(row.max_free_revisions)
                .map_err(|_| corrupt("max_free_revisions", row.max_free_revisions))?,
            farm: FarmDetails {
                farm_name: row.farm_name,
                province: row.province,
                area_rai: row.area_rai,
                crop: row.crop,
                strain: row.strain,
                cultivation_method,
            },
            applicant_language: Language::from_stored(&row.applicant_language)
                .ok_or_else(|| corrupt("applicant language", &row.applicant_language))?,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub fn cultivation_method_str(method: CultivationMethod) -> &'static str {
    match method {
        CultivationMethod::Outdoor => "outdoor",
        CultivationMethod::Greenhouse => "greenhouse",
        CultivationMethod::Indoor => "indoor",
    }
}

/// Raw `payments` row
#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub milestone: i16,
    pub amount: Decimal,
    pub status: String,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

pub const PAYMENT_COLUMNS: &str =
    "id, application_id, milestone, amount, status, due_date, paid_at, created_at";

impl TryFrom<PaymentRow> for Payment {
    type Error = WorkflowError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let milestone = u8::try_from(row.milestone)
            .ok()
            .and_then(|m| Milestone::try_from(m).ok())
            .ok_or_else(|| corrupt("payment milestone", row.milestone))?;
        let status = row
            .status
            .parse::<PaymentStatus>()
            .map_err(|_| corrupt("payment status", &row.status))?;

        Ok(Payment {
            id: row.id,
            application_id: row.application_id,
            milestone,
            amount: row.amount,
            status,
            due_date: row.due_date,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}

/// Raw `assessments` row
#[derive(Debug, Clone, FromRow)]
pub struct AssessmentRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub auditor_id: Uuid,
    pub assessment_type: String,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub passed: Option<bool>,
    pub score: Option<Decimal>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const ASSESSMENT_COLUMNS: &str = "id, application_id, auditor_id, assessment_type, status, \
     scheduled_at, passed, score, notes, created_at, updated_at";

impl TryFrom<AssessmentRow> for Assessment {
    type Error = WorkflowError;

    fn try_from(row: AssessmentRow) -> Result<Self, Self::Error> {
        Ok(Assessment {
            id: row.id,
            application_id: row.application_id,
            auditor_id: row.auditor_id,
            assessment_type: row
                .assessment_type
                .parse()
                .map_err(|_| corrupt("assessment type", &row.assessment_type))?,
            status: row
                .status
                .parse()
                .map_err(|_| corrupt("assessment status", &row.status))?,
            scheduled_at: row.scheduled_at,
            passed: row.passed,
            score: row.score,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
