//! HTTP handlers for the in-app notification inbox

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::notification::{InAppNotification, NotificationQuery, NotificationService};
use crate::AppState;

/// Inbox response
#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<InAppNotification>,
    pub unread_count: i64,
}

/// Get notifications for the current user
pub async fn get_notifications(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<NotificationQuery>,
) -> AppResult<Json<NotificationsResponse>> {
    let actor = current_user.0.actor();
    let service = NotificationService::new(state.db);
    let notifications = service.get_notifications(&actor, query).await?;
    let unread_count = service.get_unread_count(&actor).await?;
    Ok(Json(NotificationsResponse {
        notifications,
        unread_count,
    }))
}

/// Mark a notification as read
pub async fn mark_notification_read(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(notification_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = NotificationService::new(state.db);
    service
        .mark_as_read(&current_user.0.actor(), notification_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
