//! Error handling for the GACP Certification Platform
//!
//! Provides consistent error responses in Thai and English

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::WorkflowError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_th: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Workflow errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Concurrent modification: {0}")]
    ConcurrencyConflict(String),

    #[error("Corrupt workflow state: {0}")]
    CorruptState(String),

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::InvalidTransition { .. } => {
                AppError::InvalidStateTransition(err.to_string())
            }
            WorkflowError::NotPermitted { .. } => AppError::InsufficientPermissions,
            WorkflowError::PaymentNotCompleted { .. } => AppError::PaymentRequired(err.to_string()),
            WorkflowError::ConcurrencyConflict { .. } => {
                AppError::ConcurrencyConflict(err.to_string())
            }
            WorkflowError::CorruptState(msg) => AppError::CorruptState(msg),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let (field, message) = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| format!("{} is invalid", field));
                (field.to_string(), message)
            })
            .unwrap_or_else(|| ("input".to_string(), "Invalid input".to_string()));

        AppError::Validation {
            message_th: format!("ข้อมูล {} ไม่ถูกต้อง", field),
            field,
            message,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_th: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail {
                    code: "INSUFFICIENT_PERMISSIONS".to_string(),
                    message_en: "You do not have permission to perform this action".to_string(),
                    message_th: "คุณไม่มีสิทธิ์ในการดำเนินการนี้".to_string(),
                    field: None,
                },
            ),
            AppError::Validation {
                field,
                message,
                message_th,
            } => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: message.clone(),
                    message_th: message_th.clone(),
                    field: Some(field.clone()),
                },
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorDetail {
                    code: "VALIDATION_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_th: format!("ข้อมูลไม่ถูกต้อง: {}", msg),
                    field: None,
                },
            ),
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail {
                    code: "NOT_FOUND".to_string(),
                    message_en: format!("{} not found", resource),
                    message_th: format!("ไม่พบ {}", resource),
                    field: None,
                },
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail {
                    code: "INVALID_STATE_TRANSITION".to_string(),
                    message_en: msg.clone(),
                    message_th: format!("ไม่สามารถเปลี่ยนสถานะได้: {}", msg),
                    field: None,
                },
            ),
            AppError::PaymentRequired(msg) => (
                StatusCode::PAYMENT_REQUIRED,
                ErrorDetail {
                    code: "PAYMENT_REQUIRED".to_string(),
                    message_en: msg.clone(),
                    message_th: "ยังไม่ได้รับชำระค่าธรรมเนียม".to_string(),
                    field: None,
                },
            ),
            AppError::ConcurrencyConflict(_) => (
                StatusCode::CONFLICT,
                ErrorDetail {
                    code: "CONCURRENCY_CONFLICT".to_string(),
                    message_en: "The application changed while you were working on it. Please refresh."
                        .to_string(),
                    message_th: "สถานะคำขอมีการเปลี่ยนแปลง กรุณารีเฟรชหน้าจอ".to_string(),
                    field: None,
                },
            ),
            AppError::CorruptState(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "CORRUPT_STATE".to_string(),
                    message_en: "The application record is in an unknown state. Operators have been alerted."
                        .to_string(),
                    message_th: "ข้อมูลสถานะคำขอไม่ถูกต้อง ได้แจ้งผู้ดูแลระบบแล้ว".to_string(),
                    field: None,
                },
            ),
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "DATABASE_ERROR".to_string(),
                    message_en: "A database error occurred".to_string(),
                    message_th: "เกิดข้อผิดพลาดกับฐานข้อมูล".to_string(),
                    field: None,
                },
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: msg.clone(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                },
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail {
                    code: "INTERNAL_ERROR".to_string(),
                    message_en: "An internal server error occurred".to_string(),
                    message_th: "เกิดข้อผิดพลาดภายในเซิร์ฟเวอร์".to_string(),
                    field: None,
                },
            ),
        };

        // Corrupt state is an operator alert, everything else is routine
        match &self {
            AppError::CorruptState(msg) => tracing::error!(alert = true, "Corrupt state: {}", msg),
            _ => tracing::error!("Error: {:?}", self),
        }

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
