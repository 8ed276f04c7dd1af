//! Per-area database migrations.
//!
//! Each area keeps its own migration directory so a deployment that only
//! needs part of the schema can run just that part.
//!
//! # Example
//!
//! ```rust,ignore
//! use anchorage::postgres;
//! use sqlx::PgPool;
//!
//! async fn setup_database(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//!     postgres::run_all(pool).await
//! }
//! ```

use sqlx::PgPool;

/// Runs the credential store migrations (the `users` table).
pub async fn run_core(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/core").run(pool).await
}

/// Runs the audit trail migrations (the `audit_log` table).
pub async fn run_audit_log(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/audit_log").run(pool).await
}

/// Runs the notification store migrations (the `notifications` table).
pub async fn run_notifications(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations/notifications").run(pool).await
}

/// Runs every migration in dependency order.
pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    run_core(pool).await?;
    run_audit_log(pool).await?;
    run_notifications(pool).await?;
    Ok(())
}
