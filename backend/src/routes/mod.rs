//! Route definitions for the GACP Certification Platform

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes. Everything under `/api/v1` requires a bearer token.
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/applications", application_routes())
        .nest("/payments", payment_routes())
        .nest("/assessments", assessment_routes())
        .nest("/notifications", notification_routes())
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Application and workflow routes
fn application_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_applications).post(handlers::create_application),
        )
        .route(
            "/:application_id",
            get(handlers::get_application).put(handlers::update_application),
        )
        .route("/:application_id/events", post(handlers::apply_event))
        .route("/:application_id/history", get(handlers::get_application_history))
        .route("/:application_id/payment-gate", get(handlers::get_payment_gate))
        .route(
            "/:application_id/payments",
            get(handlers::list_payments).post(handlers::request_payment),
        )
        .route(
            "/:application_id/assessments",
            get(handlers::list_assessments).post(handlers::schedule_assessment),
        )
}

/// Payment-service callback routes
fn payment_routes() -> Router<AppState> {
    Router::new().route("/:payment_id/result", post(handlers::record_payment_result))
}

/// Assessment lifecycle routes
fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/:assessment_id/start", post(handlers::start_assessment))
        .route("/:assessment_id/report", post(handlers::file_assessment_report))
        .route("/:assessment_id/complete", post(handlers::complete_assessment))
}

/// Notification inbox routes
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::get_notifications))
        .route("/:notification_id/read", post(handlers::mark_notification_read))
}
