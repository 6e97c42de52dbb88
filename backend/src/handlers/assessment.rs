//! HTTP handlers for auditor assessments

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::Assessment;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::assessment::{
    AssessmentReportInput, AssessmentService, CompleteAssessmentInput, ScheduleAssessmentInput,
};
use crate::AppState;

/// Assessment with its verdict, present only once completed
#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    #[serde(flatten)]
    pub assessment: Assessment,
    pub outcome: Option<bool>,
}

impl From<Assessment> for AssessmentResponse {
    fn from(assessment: Assessment) -> Self {
        Self {
            outcome: assessment.outcome(),
            assessment,
        }
    }
}

/// Schedule an assessment for an application
pub async fn schedule_assessment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(input): Json<ScheduleAssessmentInput>,
) -> AppResult<(StatusCode, Json<AssessmentResponse>)> {
    let service = AssessmentService::new(state.db, &state.config.workflow);
    let assessment = service
        .schedule_assessment(&current_user.0.actor(), application_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(assessment.into())))
}

/// List assessments for an application
pub async fn list_assessments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<Json<Vec<AssessmentResponse>>> {
    let service = AssessmentService::new(state.db, &state.config.workflow);
    let assessments = service
        .list_assessments(&current_user.0.actor(), application_id)
        .await?;
    Ok(Json(assessments.into_iter().map(Into::into).collect()))
}

/// Start a scheduled assessment
pub async fn start_assessment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
) -> AppResult<Json<AssessmentResponse>> {
    let service = AssessmentService::new(state.db, &state.config.workflow);
    let assessment = service
        .start_assessment(&current_user.0.actor(), assessment_id)
        .await?;
    Ok(Json(assessment.into()))
}

/// File the assessment report
pub async fn file_assessment_report(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
    Json(input): Json<AssessmentReportInput>,
) -> AppResult<Json<AssessmentResponse>> {
    let service = AssessmentService::new(state.db, &state.config.workflow);
    let assessment = service
        .file_report(&current_user.0.actor(), assessment_id, input)
        .await?;
    Ok(Json(assessment.into()))
}

/// Record the assessment verdict
pub async fn complete_assessment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(assessment_id): Path<Uuid>,
    Json(input): Json<CompleteAssessmentInput>,
) -> AppResult<Json<AssessmentResponse>> {
    let service = AssessmentService::new(state.db, &state.config.workflow);
    let assessment = service
        .complete_assessment(&current_user.0.actor(), assessment_id, input)
        .await?;
    Ok(Json(assessment.into()))
}
