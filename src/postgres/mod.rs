//! Postgres-backed repositories over `sqlx`.

mod audit_log;
mod migrations;
mod notification;
mod user;

pub use audit_log::PostgresAuditLogRepository;
pub use migrations::{run_all, run_audit_log, run_core, run_notifications};
pub use notification::PostgresNotificationRepository;
pub use user::PostgresUserRepository;

use sqlx::PgPool;

/// Creates all Postgres repository instances from a connection pool.
pub fn create_repositories(
    pool: PgPool,
) -> (
    PostgresUserRepository,
    PostgresAuditLogRepository,
    PostgresNotificationRepository,
) {
    (
        PostgresUserRepository::new(pool.clone()),
        PostgresAuditLogRepository::new(pool.clone()),
        PostgresNotificationRepository::new(pool),
    )
}
