//! HTTP handlers for application endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{Application, PaginatedResponse, Pagination, UserRole, WorkflowStatus};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::application::{
    ApplicationFilter, ApplicationService, CreateApplicationInput, TransitionRecord,
    UpdateFarmInput,
};
use crate::AppState;

// ============================================================================
// Application CRUD
// ============================================================================

/// Create a draft application
pub async fn create_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateApplicationInput>,
) -> AppResult<(StatusCode, Json<Application>)> {
    require_role(&current_user.0, &[UserRole::Applicant])?;

    let service = ApplicationService::new(state.db);
    let application = service
        .create_application(
            &current_user.0.actor(),
            state.config.revision_policy(),
            input,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(application)))
}

/// Get an application by ID
pub async fn get_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<Json<Application>> {
    let service = ApplicationService::new(state.db);
    let application = service
        .get_application(&current_user.0.actor(), application_id)
        .await?;
    Ok(Json(application))
}

/// Query parameters for listing applications
#[derive(Debug, Deserialize)]
pub struct ListApplicationsQuery {
    pub workflow_status: Option<WorkflowStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List applications visible to the current user
pub async fn list_applications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListApplicationsQuery>,
) -> AppResult<Json<PaginatedResponse<Application>>> {
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page).max(1),
        per_page: query.per_page.unwrap_or(defaults.per_page).clamp(1, 100),
    };
    let filter = ApplicationFilter {
        workflow_status: query.workflow_status,
    };

    let service = ApplicationService::new(state.db);
    let page = service
        .list_applications(&current_user.0.actor(), filter, pagination)
        .await?;
    Ok(Json(page))
}

/// Update farm details on a draft
pub async fn update_application(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(input): Json<UpdateFarmInput>,
) -> AppResult<Json<Application>> {
    let service = ApplicationService::new(state.db);
    let application = service
        .update_farm_details(&current_user.0.actor(), application_id, input)
        .await?;
    Ok(Json(application))
}

/// Audit trail of workflow transitions
pub async fn get_application_history(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<Json<Vec<TransitionRecord>>> {
    let service = ApplicationService::new(state.db);
    let history = service
        .get_history(&current_user.0.actor(), application_id)
        .await?;
    Ok(Json(history))
}
