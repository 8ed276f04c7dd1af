use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repository::{
    NewNotification, Notification, NotificationKind, NotificationRepository,
};
use crate::AuthError;

const NOTIFICATION_COLUMNS: &str =
    "id, user_id, title, message, kind, module, related_id, read, created_at";

#[derive(Clone)]
pub struct PostgresNotificationRepository {
    pool: PgPool,
}

impl PostgresNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: i64,
    user_id: i64,
    title: String,
    message: String,
    kind: String,
    module: Option<String>,
    related_id: Option<i64>,
    read: bool,
    created_at: DateTime<Utc>,
}

impl From<NotificationRecord> for Notification {
    fn from(row: NotificationRecord) -> Self {
        Notification {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            message: row.message,
            kind: NotificationKind::parse(&row.kind).unwrap_or(NotificationKind::Info),
            module: row.module,
            related_id: row.related_id,
            read: row.read,
            created_at: row.created_at,
        }
    }
}

fn db_error(operation: &str, e: sqlx::Error) -> AuthError {
    log::error!(target: "anchorage", "msg=\"database error\", operation=\"{operation}\", error=\"{e}\"");
    AuthError::DatabaseError(e.to_string())
}

#[async_trait]
impl NotificationRepository for PostgresNotificationRepository {
    async fn list_for_user(
        &self,
        user_id: i64,
        limit: i64,
    ) -> Result<Vec<Notification>, AuthError> {
        let rows: Vec<NotificationRecord> = sqlx::query_as(&format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list_for_user", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn create(&self, notification: NewNotification) -> Result<Notification, AuthError> {
        let row: NotificationRecord = sqlx::query_as(&format!(
            "INSERT INTO notifications (user_id, title, message, kind, module, related_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(notification.user_id)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(&notification.module)
        .bind(notification.related_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("create", e))?;

        Ok(row.into())
    }

    async fn set_read(
        &self,
        id: i64,
        owner_id: i64,
        read: bool,
    ) -> Result<Option<Notification>, AuthError> {
        // ownership is part of the WHERE clause, so a foreign id reads
        // the same as a missing one
        let row: Option<NotificationRecord> = sqlx::query_as(&format!(
            "UPDATE notifications SET read = $1 WHERE id = $2 AND user_id = $3 \
             RETURNING {NOTIFICATION_COLUMNS}"
        ))
        .bind(read)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("set_read", e))?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AuthError> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("delete", e))?;

        Ok(result.rows_affected() > 0)
    }
}
