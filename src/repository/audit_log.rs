use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Security-relevant event kinds recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Login,
    Logout,
    LoginFailed,
    PasswordChange,
    PasswordReset,
    AccountLocked,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Login => "LOGIN",
            AuditAction::Logout => "LOGOUT",
            AuditAction::LoginFailed => "LOGIN_FAILED",
            AuditAction::PasswordChange => "PASSWORD_CHANGE",
            AuditAction::PasswordReset => "PASSWORD_RESET",
            AuditAction::AccountLocked => "ACCOUNT_LOCKED",
        }
    }

    pub fn parse(s: &str) -> Option<AuditAction> {
        match s {
            "LOGIN" => Some(AuditAction::Login),
            "LOGOUT" => Some(AuditAction::Logout),
            "LOGIN_FAILED" => Some(AuditAction::LoginFailed),
            "PASSWORD_CHANGE" => Some(AuditAction::PasswordChange),
            "PASSWORD_RESET" => Some(AuditAction::PasswordReset),
            "ACCOUNT_LOCKED" => Some(AuditAction::AccountLocked),
            _ => None,
        }
    }
}

/// Client-side request metadata carried into audit entries.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientInfo {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A persisted audit entry. Append-only: nothing in this crate updates or
/// deletes one. `user_id` is null for anonymous/system actors (failed
/// logins for unknown emails, reset requests for missing accounts).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub action: AuditAction,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// An entry about to be appended; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub action: AuditAction,
    pub success: bool,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub detail: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction, success: bool, client: &ClientInfo) -> Self {
        Self {
            user_id: None,
            email: None,
            action,
            success,
            ip_address: client.ip_address.clone(),
            user_agent: client.user_agent.clone(),
            detail: None,
        }
    }

    #[must_use]
    pub fn user(mut self, user_id: i64) -> Self {
        self.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Filter conjunction for audit queries. Every set field must match;
/// results come back newest first.
#[derive(Debug, Clone)]
pub struct AuditQuery {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub action: Option<AuditAction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            user_id: None,
            email: None,
            action: None,
            from: None,
            to: None,
            offset: 0,
            limit: 50,
        }
    }
}

#[async_trait]
pub trait AuditLogRepository {
    /// Appends an entry. Callers that must not fail on audit errors go
    /// through [`crate::audit::record`] instead of calling this directly.
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuthError>;

    /// Runs the filter conjunction, newest first with offset/limit. An
    /// empty match is an empty vec, never an error.
    async fn query(&self, query: AuditQuery) -> Result<Vec<AuditEntry>, AuthError>;

    /// Counts LOGIN_FAILED entries for `email` since `since`. Read side
    /// of the lockout policy; recomputed on every check.
    async fn count_failed_logins(&self, email: &str, since: DateTime<Utc>)
        -> Result<u32, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_round_trip() {
        for action in [
            AuditAction::Login,
            AuditAction::Logout,
            AuditAction::LoginFailed,
            AuditAction::PasswordChange,
            AuditAction::PasswordReset,
            AuditAction::AccountLocked,
        ] {
            assert_eq!(AuditAction::parse(action.as_str()), Some(action));
        }
        assert_eq!(AuditAction::parse("SOMETHING_ELSE"), None);
    }

    #[test]
    fn test_new_entry_builder() {
        let client = ClientInfo {
            ip_address: Some("10.0.0.1".to_owned()),
            user_agent: Some("test-agent".to_owned()),
        };
        let entry = NewAuditEntry::new(AuditAction::LoginFailed, false, &client)
            .email("user@example.com")
            .detail(serde_json::json!({"reason": "wrong-password"}));

        assert_eq!(entry.action, AuditAction::LoginFailed);
        assert!(!entry.success);
        assert_eq!(entry.user_id, None);
        assert_eq!(entry.email.as_deref(), Some("user@example.com"));
        assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
    }
}
