use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, QueryBuilder};

use crate::repository::{
    AuditAction, AuditEntry, AuditLogRepository, AuditQuery, NewAuditEntry,
};
use crate::AuthError;

#[derive(Clone)]
pub struct PostgresAuditLogRepository {
    pool: PgPool,
}

impl PostgresAuditLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AuditRecord {
    id: i64,
    user_id: Option<i64>,
    email: Option<String>,
    action: String,
    success: bool,
    ip_address: Option<String>,
    user_agent: Option<String>,
    detail: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl From<AuditRecord> for AuditEntry {
    fn from(row: AuditRecord) -> Self {
        AuditEntry {
            id: row.id,
            user_id: row.user_id,
            email: row.email,
            // unknown strings cannot occur through this crate; treat a
            // manually inserted one as a failed login rather than panic
            action: AuditAction::parse(&row.action).unwrap_or(AuditAction::LoginFailed),
            success: row.success,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            detail: row.detail,
            created_at: row.created_at,
        }
    }
}

fn db_error(operation: &str, e: sqlx::Error) -> AuthError {
    log::error!(target: "anchorage", "msg=\"database error\", operation=\"{operation}\", error=\"{e}\"");
    AuthError::DatabaseError(e.to_string())
}

#[async_trait]
impl AuditLogRepository for PostgresAuditLogRepository {
    async fn append(&self, entry: NewAuditEntry) -> Result<AuditEntry, AuthError> {
        let row: AuditRecord = sqlx::query_as(
            "INSERT INTO audit_log (user_id, email, action, success, ip_address, user_agent, detail) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, user_id, email, action, success, ip_address, user_agent, detail, created_at"
        )
        .bind(entry.user_id)
        .bind(&entry.email)
        .bind(entry.action.as_str())
        .bind(entry.success)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.detail)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("append", e))?;

        Ok(row.into())
    }

    async fn query(&self, query: AuditQuery) -> Result<Vec<AuditEntry>, AuthError> {
        let mut builder = QueryBuilder::new(
            "SELECT id, user_id, email, action, success, ip_address, user_agent, detail, \
             created_at FROM audit_log WHERE 1 = 1",
        );

        if let Some(user_id) = query.user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(email) = &query.email {
            builder.push(" AND email = ").push_bind(email.clone());
        }
        if let Some(action) = query.action {
            builder.push(" AND action = ").push_bind(action.as_str());
        }
        if let Some(from) = query.from {
            builder.push(" AND created_at >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            builder.push(" AND created_at <= ").push_bind(to);
        }

        builder
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let rows: Vec<AuditRecord> = builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_error("query", e))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count_failed_logins(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, AuthError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_log \
             WHERE email = $1 AND action = 'LOGIN_FAILED' AND created_at >= $2",
        )
        .bind(email)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("count_failed_logins", e))?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }
}
