//! Repository traits and record types.
//!
//! Storage abstractions for the three entities the core owns. Implement
//! these traits to plug in another backend; [`crate::postgres`] is the
//! production implementation.
//!
//! | Trait | Description |
//! |-------|-------------|
//! | [`UserRepository`] | Credential records, including the embedded reset-token fields |
//! | [`AuditLogRepository`] | Append-only security audit trail |
//! | [`NotificationRepository`] | Per-user notification inbox |
//!
//! The `Mock*` implementations are in-memory (`Arc<Mutex<Vec<_>>>`) and
//! back the unit and router tests; they are compiled unconditionally so
//! integration tests and demos can use them too.

mod audit_log;
mod notification;
mod user;

mod audit_log_mock;
mod notification_mock;
mod user_mock;

pub use audit_log::{
    AuditAction, AuditEntry, AuditLogRepository, AuditQuery, ClientInfo, NewAuditEntry,
};
pub use notification::{NewNotification, Notification, NotificationKind, NotificationRepository};
pub use user::{NewUser, Role, User, UserRepository};

pub use audit_log_mock::MockAuditLogRepository;
pub use notification_mock::MockNotificationRepository;
pub use user_mock::MockUserRepository;
