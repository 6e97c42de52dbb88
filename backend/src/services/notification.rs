//! Notification service: in-app inbox fed by the workflow outbox
//!
//! Rows are written by the workflow commit in the same transaction as the
//! state change. This service only reads and acknowledges them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Actor, NotificationType};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

/// Notification service for the in-app inbox
#[derive(Clone)]
pub struct NotificationService {
    db: PgPool,
}

/// Raw notification row
#[derive(Debug, Clone, FromRow)]
pub struct NotificationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub application_id: Option<Uuid>,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

/// In-app notification
#[derive(Debug, Clone, Serialize)]
pub struct InAppNotification {
    pub id: Uuid,
    pub application_id: Option<Uuid>,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub action_url: Option<String>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
}

impl TryFrom<NotificationRow> for InAppNotification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let notification_type = row.notification_type.parse().map_err(|_| {
            AppError::CorruptState(format!(
                "notification {} has unknown type {}",
                row.id, row.notification_type
            ))
        })?;

        Ok(Self {
            id: row.id,
            application_id: row.application_id,
            notification_type,
            title: row.title,
            message: row.message,
            action_url: row.action_url,
            is_read: row.is_read,
            created_at: row.created_at,
            read_at: row.read_at,
        })
    }
}

/// Inbox query
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    #[serde(default)]
    pub unread_only: bool,
    pub limit: Option<i64>,
}

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

const NOTIFICATION_COLUMNS: &str = "id, user_id, application_id, notification_type, title, \
     message, action_url, is_read, created_at, read_at";

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Get the actor's notifications, newest first
    pub async fn get_notifications(
        &self,
        actor: &Actor,
        query: NotificationQuery,
    ) -> AppResult<Vec<InAppNotification>> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            r#"
            SELECT {}
            FROM notifications
            WHERE user_id = $1 AND ($2 = false OR is_read = false)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
            NOTIFICATION_COLUMNS
        ))
        .bind(actor.user_id)
        .bind(query.unread_only)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(InAppNotification::try_from).collect()
    }

    /// Get unread notification count
    pub async fn get_unread_count(&self, actor: &Actor) -> AppResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_read = false",
        )
        .bind(actor.user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(count)
    }

    /// Mark notification as read
    pub async fn mark_as_read(&self, actor: &Actor, notification_id: Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE notifications
            SET is_read = true, read_at = COALESCE(read_at, NOW())
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(notification_id)
        .bind(actor.user_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Notification".to_string()));
        }

        Ok(())
    }
}
