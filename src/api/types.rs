use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repository::{AuditEntry, Notification, User};
use crate::validators::ValidationError;
use crate::SecretString;

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub module: Option<String>,
    pub related_id: Option<i64>,
    /// Defaults to the caller.
    pub target_user_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotificationRequest {
    pub read: bool,
}

/// Query-string filters for the audit log listing. All of them are
/// optional and combined as a conjunction.
#[derive(Debug, Default, Deserialize)]
pub struct AuditLogParams {
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub action: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

// Response DTOs

/// The public projection of a user. Password hash and reset-token fields
/// never appear here.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub email_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role.as_str().to_owned(),
            email_verified: user.email_verified,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct AuditLogResponse {
    pub entries: Vec<AuditEntry>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl From<crate::AuthError> for ErrorResponse {
    fn from(err: crate::AuthError) -> Self {
        let code = match &err {
            crate::AuthError::Validation(_) => "VALIDATION_ERROR",
            crate::AuthError::EmailTaken => "EMAIL_TAKEN",
            crate::AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            crate::AuthError::AccountLocked => "ACCOUNT_LOCKED",
            crate::AuthError::InvalidOrExpiredToken => "INVALID_OR_EXPIRED_TOKEN",
            crate::AuthError::Unauthenticated => "UNAUTHENTICATED",
            crate::AuthError::Forbidden => "FORBIDDEN",
            crate::AuthError::NotFound => "NOT_FOUND",
            crate::AuthError::UserNotFound => "USER_NOT_FOUND",
            crate::AuthError::PasswordHashError => "PASSWORD_HASH_ERROR",
            crate::AuthError::EmailDelivery(_) => "EMAIL_DELIVERY_FAILED",
            crate::AuthError::DatabaseError(_) => "DATABASE_ERROR",
        };

        let details = match &err {
            crate::AuthError::Validation(errors) => Some(
                errors
                    .iter()
                    .map(|e: &ValidationError| FieldError {
                        field: e.field(),
                        message: e.to_string(),
                    })
                    .collect(),
            ),
            _ => None,
        };

        // internal errors keep their details in the logs, not the body
        let error = match &err {
            crate::AuthError::DatabaseError(_) => "Internal error".to_owned(),
            crate::AuthError::EmailDelivery(_) => "Email delivery failed".to_owned(),
            other => other.to_string(),
        };

        ErrorResponse {
            error,
            code: code.to_owned(),
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AuthError;

    #[test]
    fn test_validation_error_carries_field_details() {
        let response = ErrorResponse::from(AuthError::Validation(vec![
            ValidationError::EmailInvalidFormat,
            ValidationError::PasswordTooShort,
        ]));

        assert_eq!(response.code, "VALIDATION_ERROR");
        let details = response.details.unwrap();
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "email");
        assert_eq!(details[1].field, "password");
    }

    #[test]
    fn test_database_error_message_is_not_leaked() {
        let response =
            ErrorResponse::from(AuthError::DatabaseError("connection refused".to_owned()));
        assert_eq!(response.error, "Internal error");
        assert_eq!(response.code, "DATABASE_ERROR");
    }

    #[test]
    fn test_delivery_error_message_is_not_leaked() {
        let response = ErrorResponse::from(AuthError::EmailDelivery(
            "smtp host 10.0.0.5 refused connection".to_owned(),
        ));
        assert_eq!(response.error, "Email delivery failed");
        assert_eq!(response.code, "EMAIL_DELIVERY_FAILED");
    }

    #[test]
    fn test_user_response_from_user_omits_secrets() {
        let user = User::mock_from_email("user@example.com");
        let response = UserResponse::from(user);
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["role"], "staff");
    }
}
