//! Authentication, audit-trail and notification core for the ERP backend.
//!
//! The crate is organised the same way at every layer:
//!
//! - [`repository`] holds the record types and storage traits
//!   ([`UserRepository`], [`AuditLogRepository`], [`NotificationRepository`])
//!   together with in-memory mock implementations for tests and demos.
//! - [`actions`] holds one struct per auth flow (signup, login,
//!   change-password, reset-request, reset-confirm), generic over the
//!   repositories it touches.
//! - [`postgres`] provides the production repositories over `sqlx`.
//! - [`api::axum`] wires the actions to JSON endpoints.
//!
//! Sessions and mail delivery are external collaborators; [`session`] and
//! [`mailer`] only define the seams (plus in-memory/logging stand-ins).

pub mod actions;
pub mod api;
pub mod audit;
pub mod config;
pub mod crypto;
pub mod lockout;
pub mod mailer;
pub mod notifications;
pub mod postgres;
pub mod repository;
pub mod session;
pub mod token;
pub mod validators;

pub use config::{AuthConfig, LockoutConfig};
pub use crypto::{BcryptHasher, PasswordHasher, SecretString};
pub use repository::{
    AuditAction, AuditEntry, AuditLogRepository, AuditQuery, ClientInfo, MockAuditLogRepository,
    MockNotificationRepository, MockUserRepository, NewAuditEntry, NewNotification, NewUser,
    Notification, NotificationKind, NotificationRepository, Role, User, UserRepository,
};
pub use session::{InMemorySessionStore, Session, SessionStore};
pub use validators::ValidationError;

use std::fmt;

/// Error taxonomy shared by every flow in the core.
///
/// The merged variants are deliberate: [`AuthError::InvalidCredentials`]
/// covers "no such user" and "wrong password" alike, and
/// [`AuthError::InvalidOrExpiredToken`] covers wrong, expired and
/// inactive-account reset tokens, so responses never reveal which case
/// applied.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthError {
    /// Malformed or missing input, with one entry per offending field.
    Validation(Vec<ValidationError>),
    /// An account with the normalized email already exists.
    EmailTaken,
    /// Wrong password or unknown/inactive account.
    InvalidCredentials,
    /// Too many recent failed logins for this email.
    AccountLocked,
    /// Reset token is wrong, expired, or belongs to an inactive account.
    InvalidOrExpiredToken,
    /// No or invalid session.
    Unauthenticated,
    /// Authenticated but lacking the required role.
    Forbidden,
    /// Entity absent or not owned by the caller.
    NotFound,
    /// Defensive: session identity points at no user record.
    UserNotFound,
    PasswordHashError,
    /// Mail delivery failed where the flow surfaces it (reset-request).
    EmailDelivery(String),
    DatabaseError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, e) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            AuthError::EmailTaken => write!(f, "An account with this email already exists"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::AccountLocked => {
                write!(f, "Account temporarily locked due to failed login attempts")
            }
            AuthError::InvalidOrExpiredToken => write!(f, "Invalid or expired reset token"),
            AuthError::Unauthenticated => write!(f, "Authentication required"),
            AuthError::Forbidden => write!(f, "Insufficient permissions"),
            AuthError::NotFound => write!(f, "Not found"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::PasswordHashError => write!(f, "Failed to hash password"),
            AuthError::EmailDelivery(msg) => write!(f, "Email delivery failed: {msg}"),
            AuthError::DatabaseError(msg) => write!(f, "Database error: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        AuthError::Validation(vec![err])
    }
}
