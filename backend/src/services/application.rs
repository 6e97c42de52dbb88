//! Application service: drafts, listing and audit history

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::{
    Actor, Application, ApplicationNumber, CultivationMethod, PaginatedResponse, Pagination,
    PaginationMeta, RevisionPolicy, WorkflowStatus,
};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{cultivation_method_str, ApplicationRow, APPLICATION_COLUMNS};
use crate::services::workflow::{application_from_row, ensure_can_access};

/// Application service for managing certification requests
#[derive(Clone)]
pub struct ApplicationService {
    db: PgPool,
}

/// Input for creating a draft application
#[derive(Debug, Deserialize, Validate)]
pub struct CreateApplicationInput {
    pub product_id: Uuid,
    #[validate(length(min = 1, max = 200, message = "Farm name is required"))]
    pub farm_name: String,
    #[validate(length(min = 1, message = "Province is required"))]
    pub province: String,
    pub area_rai: Decimal,
    #[validate(length(min = 1, max = 200, message = "Crop is required"))]
    pub crop: String,
    pub strain: Option<String>,
    pub cultivation_method: CultivationMethod,
}

/// Input for updating farm details of a draft
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFarmInput {
    #[validate(length(min = 1, max = 200, message = "Farm name cannot be empty"))]
    pub farm_name: Option<String>,
    pub province: Option<String>,
    pub area_rai: Option<Decimal>,
    #[validate(length(min = 1, max = 200, message = "Crop cannot be empty"))]
    pub crop: Option<String>,
    pub strain: Option<String>,
    pub cultivation_method: Option<CultivationMethod>,
    /// Version the client last read
    pub version: i64,
}

/// Filter for listing applications
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationFilter {
    pub workflow_status: Option<WorkflowStatus>,
}

/// One committed workflow transition
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TransitionRecord {
    pub id: Uuid,
    pub from_status: String,
    pub to_status: String,
    pub event_name: String,
    pub event: serde_json::Value,
    pub actor_id: Uuid,
    pub actor_role: String,
    pub revision_count: i32,
    pub created_at: DateTime<Utc>,
}

impl ApplicationService {
    /// Create a new ApplicationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a draft application for the applicant
    pub async fn create_application(
        &self,
        actor: &Actor,
        policy: RevisionPolicy,
        input: CreateApplicationInput,
    ) -> AppResult<Application> {
        input.validate()?;
        validate_farm(&input.province, input.area_rai)?;

        let mut tx = self.db.begin().await?;

        // Per-year counter; the row lock serializes numbering and a failed
        // insert rolls the counter back with it
        let year = Utc::now().year();
        let sequence: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO application_number_counters (year, last_value)
            VALUES ($1, 1)
            ON CONFLICT (year) DO UPDATE
                SET last_value = application_number_counters.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(year)
        .fetch_one(&mut *tx)
        .await?;
        let number = application_number(year, sequence)?;

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            INSERT INTO applications (
                application_number, applicant_id, product_id, workflow_status,
                revision_count, max_free_revisions, farm_name, province, area_rai,
                crop, strain, cultivation_method, applicant_language
            )
            VALUES ($1, $2, $3, $4, 0, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(number.as_str())
        .bind(actor.user_id)
        .bind(input.product_id)
        .bind(WorkflowStatus::Draft.as_str())
        .bind(i32::try_from(policy.max_free_revisions).unwrap_or(i32::MAX))
        .bind(&input.farm_name)
        .bind(&input.province)
        .bind(input.area_rai)
        .bind(&input.crop)
        .bind(&input.strain)
        .bind(cultivation_method_str(input.cultivation_method))
        .bind(actor.preferred_language.code())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(application_number = %number, "Draft application created");

        application_from_row(row)
    }

    /// Get an application the actor may see
    pub async fn get_application(
        &self,
        actor: &Actor,
        application_id: Uuid,
    ) -> AppResult<Application> {
        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications WHERE id = $1",
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Application".to_string()))?;

        let application = application_from_row(row)?;
        ensure_can_access(&application, actor)?;
        Ok(application)
    }

    /// List applications. Applicants see their own, staff see all.
    pub async fn list_applications(
        &self,
        actor: &Actor,
        filter: ApplicationFilter,
        pagination: Pagination,
    ) -> AppResult<PaginatedResponse<Application>> {
        let applicant_id = (!actor.role.is_staff()).then_some(actor.user_id);
        let status = filter.workflow_status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM applications
            WHERE ($1::UUID IS NULL OR applicant_id = $1)
              AND ($2::TEXT IS NULL OR workflow_status = $2)
            "#,
        )
        .bind(applicant_id)
        .bind(status)
        .fetch_one(&self.db)
        .await?;

        let rows = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            SELECT {} FROM applications
            WHERE ($1::UUID IS NULL OR applicant_id = $1)
              AND ($2::TEXT IS NULL OR workflow_status = $2)
            ORDER BY updated_at DESC
            LIMIT $3 OFFSET $4
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(applicant_id)
        .bind(status)
        .bind(i64::from(pagination.per_page))
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let data = rows
            .into_iter()
            .map(application_from_row)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(&pagination, u64::try_from(total).unwrap_or(0)),
        })
    }

    /// Update farm details. Only drafts are editable.
    pub async fn update_farm_details(
        &self,
        actor: &Actor,
        application_id: Uuid,
        input: UpdateFarmInput,
    ) -> AppResult<Application> {
        input.validate()?;

        let existing = self.get_application(actor, application_id).await?;
        if existing.applicant_id != actor.user_id {
            return Err(AppError::InsufficientPermissions);
        }
        if existing.workflow_status != WorkflowStatus::Draft {
            return Err(AppError::InvalidStateTransition(format!(
                "farm details are locked in status {}",
                existing.workflow_status
            )));
        }

        validate_farm(
            input.province.as_deref().unwrap_or(&existing.farm.province),
            input.area_rai.unwrap_or(existing.farm.area_rai),
        )?;

        let row = sqlx::query_as::<_, ApplicationRow>(&format!(
            r#"
            UPDATE applications SET
                farm_name = COALESCE($3, farm_name),
                province = COALESCE($4, province),
                area_rai = COALESCE($5, area_rai),
                crop = COALESCE($6, crop),
                strain = COALESCE($7, strain),
                cultivation_method = COALESCE($8, cultivation_method),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1 AND version = $2 AND workflow_status = 'DRAFT'
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        ))
        .bind(application_id)
        .bind(input.version)
        .bind(&input.farm_name)
        .bind(&input.province)
        .bind(input.area_rai)
        .bind(&input.crop)
        .bind(&input.strain)
        .bind(input.cultivation_method.map(cultivation_method_str))
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| {
            AppError::ConcurrencyConflict(format!(
                "application {} changed since version {}",
                application_id, input.version
            ))
        })?;

        application_from_row(row)
    }

    /// Committed transitions for an application, oldest first
    pub async fn get_history(
        &self,
        actor: &Actor,
        application_id: Uuid,
    ) -> AppResult<Vec<TransitionRecord>> {
        let _ = self.get_application(actor, application_id).await?;

        let history = sqlx::query_as::<_, TransitionRecord>(
            r#"
            SELECT id, from_status, to_status, event_name, event,
                   actor_id, actor_role, revision_count, created_at
            FROM workflow_transitions
            WHERE application_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(application_id)
        .fetch_all(&self.db)
        .await?;

        Ok(history)
    }
}

/// Number for the `sequence`-th application of `year`
fn application_number(year: i32, sequence: i32) -> AppResult<ApplicationNumber> {
    let number = u16::try_from(year)
        .ok()
        .zip(u32::try_from(sequence).ok())
        .and_then(|(year, sequence)| ApplicationNumber::new(year, sequence));

    number.ok_or_else(|| {
        tracing::error!(year, sequence, alert = true, "Application numbers exhausted");
        AppError::Internal(format!(
            "no application numbers left for {} (sequence {})",
            year, sequence
        ))
    })
}

fn validate_farm(province: &str, area_rai: Decimal) -> AppResult<()> {
    shared::validate_thai_province(province).map_err(|msg| AppError::Validation {
        field: "province".to_string(),
        message: msg.to_string(),
        message_th: "จังหวัดไม่อยู่ในพื้นที่ที่ได้รับอนุญาต".to_string(),
    })?;
    shared::validate_farm_area(area_rai).map_err(|msg| AppError::Validation {
        field: "area_rai".to_string(),
        message: msg.to_string(),
        message_th: "ขนาดพื้นที่ไม่ถูกต้อง".to_string(),
    })?;
    Ok(())
}
