//! HTTP handlers for workflow events and payment gates

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use shared::{Application, PaymentGate, WorkflowEvent};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::workflow::WorkflowService;
use crate::AppState;

/// Apply a workflow event to an application
///
/// The body is a tagged event, e.g. `{"type": "REVIEW_REJECT"}`.
pub async fn apply_event(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
    Json(event): Json<WorkflowEvent>,
) -> AppResult<Json<Application>> {
    let service = WorkflowService::with_pool(state.db);
    let application = service
        .apply_client_event(application_id, event, &current_user.0.actor())
        .await?;
    Ok(Json(application))
}

/// Payment gate response
#[derive(Debug, Serialize)]
pub struct PaymentGateResponse {
    pub payment_required: bool,
    pub gate: Option<PaymentGate>,
}

/// Get the payment the applicant currently owes, if any
pub async fn get_payment_gate(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<Json<PaymentGateResponse>> {
    let service = WorkflowService::with_pool(state.db);
    let gate = service
        .payment_gate(application_id, &current_user.0.actor())
        .await?;
    Ok(Json(PaymentGateResponse {
        payment_required: gate.is_some(),
        gate,
    }))
}
