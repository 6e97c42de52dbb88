//! HTTP handlers for milestone payments

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use shared::{Payment, PaymentStatus, UserRole};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::{require_role, CurrentUser};
use crate::services::payment::PaymentService;
use crate::AppState;

/// Payment with its overdue flag as of today
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    #[serde(flatten)]
    pub payment: Payment,
    pub overdue: bool,
}

impl PaymentResponse {
    fn new(payment: Payment, today: NaiveDate) -> Self {
        Self {
            overdue: payment.is_overdue(today),
            payment,
        }
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Issue (or return the open) invoice for the milestone currently due
pub async fn request_payment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<(StatusCode, Json<PaymentResponse>)> {
    let service = PaymentService::new(state.db, &state.config.workflow);
    let payment = service
        .request_payment(&current_user.0.actor(), application_id)
        .await?;
    Ok((StatusCode::CREATED, Json(PaymentResponse::new(payment, today()))))
}

/// List payments for an application
pub async fn list_payments(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(application_id): Path<Uuid>,
) -> AppResult<Json<Vec<PaymentResponse>>> {
    let service = PaymentService::new(state.db, &state.config.workflow);
    let payments = service
        .list_payments(&current_user.0.actor(), application_id)
        .await?;
    let today = today();
    Ok(Json(
        payments
            .into_iter()
            .map(|payment| PaymentResponse::new(payment, today))
            .collect(),
    ))
}

/// Payment-service callback body
#[derive(Debug, Deserialize)]
pub struct PaymentResultInput {
    pub status: PaymentStatus,
}

/// Record the result reported by the payment service
pub async fn record_payment_result(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(payment_id): Path<Uuid>,
    Json(input): Json<PaymentResultInput>,
) -> AppResult<Json<PaymentResponse>> {
    require_role(&current_user.0, &[UserRole::System, UserRole::Admin])?;

    let service = PaymentService::new(state.db, &state.config.workflow);
    let payment = service.record_payment_result(payment_id, input.status).await?;
    Ok(Json(PaymentResponse::new(payment, today())))
}
