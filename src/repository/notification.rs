use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validators::ValidationError;
use crate::AuthError;

/// Severity/category of a notification as rendered by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    Info,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Success => "success",
            NotificationKind::Warning => "warning",
            NotificationKind::Error => "error",
            NotificationKind::Info => "info",
        }
    }

    /// Parses the wire value, rejecting anything outside the enumerated
    /// set.
    pub fn parse(s: &str) -> Result<NotificationKind, ValidationError> {
        match s {
            "success" => Ok(NotificationKind::Success),
            "warning" => Ok(NotificationKind::Warning),
            "error" => Ok(NotificationKind::Error),
            "info" => Ok(NotificationKind::Info),
            _ => Err(ValidationError::NotificationTypeInvalid),
        }
    }
}

/// An inbox entry. Mutable only by its owner, and only the `read` flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub module: Option<String>,
    pub related_id: Option<i64>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub module: Option<String>,
    pub related_id: Option<i64>,
}

#[async_trait]
pub trait NotificationRepository {
    /// Newest first, at most `limit` rows.
    async fn list_for_user(&self, user_id: i64, limit: i64)
        -> Result<Vec<Notification>, AuthError>;

    async fn create(&self, notification: NewNotification) -> Result<Notification, AuthError>;

    /// Updates the read flag only when the entry belongs to `owner_id`;
    /// `None` otherwise (reported to the caller as not-found).
    async fn set_read(
        &self,
        id: i64,
        owner_id: i64,
        read: bool,
    ) -> Result<Option<Notification>, AuthError>;

    /// Deletes only when owned; `false` otherwise.
    async fn delete(&self, id: i64, owner_id: i64) -> Result<bool, AuthError>;
}
