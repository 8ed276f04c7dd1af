use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repository::{NewUser, Role, User, UserRepository};
use crate::AuthError;

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, hashed_password, is_active, \
     email_verified, reset_token, reset_token_expiry, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    first_name: String,
    last_name: String,
    role: String,
    hashed_password: String,
    is_active: bool,
    email_verified: bool,
    reset_token: Option<String>,
    reset_token_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRecord> for User {
    fn from(row: UserRecord) -> Self {
        User {
            id: row.id,
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            role: Role::parse(&row.role).unwrap_or_default(),
            hashed_password: row.hashed_password,
            is_active: row.is_active,
            email_verified: row.email_verified,
            reset_token: row.reset_token,
            reset_token_expiry: row.reset_token_expiry,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn db_error(operation: &str, e: sqlx::Error) -> AuthError {
    log::error!(target: "anchorage", "msg=\"database error\", operation=\"{operation}\", error=\"{e}\"");
    AuthError::DatabaseError(e.to_string())
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find_by_id", e))?;

        Ok(row.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("find_by_email", e))?;

        Ok(row.map(Into::into))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AuthError> {
        let row: UserRecord = sqlx::query_as(&format!(
            "INSERT INTO users (email, first_name, last_name, role, hashed_password) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(&new_user.email)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.role.as_str())
        .bind(&new_user.hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // a concurrent signup for the same email hits the unique index
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                AuthError::EmailTaken
            } else {
                db_error("create", e)
            }
        })?;

        Ok(row.into())
    }

    async fn update_password(&self, user_id: i64, hashed_password: &str) -> Result<(), AuthError> {
        let result =
            sqlx::query("UPDATE users SET hashed_password = $1, updated_at = NOW() WHERE id = $2")
                .bind(hashed_password)
                .bind(user_id)
                .execute(&self.pool)
                .await
                .map_err(|e| db_error("update_password", e))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    async fn set_reset_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let result = sqlx::query(
            "UPDATE users SET reset_token = $1, reset_token_expiry = $2, updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(token)
        .bind(expires_at)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("set_reset_token", e))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }

        Ok(())
    }

    async fn find_by_valid_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> = sqlx::query_as(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE reset_token = $1 AND reset_token_expiry > $2 AND is_active = TRUE"
        ))
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find_by_valid_reset_token", e))?;

        Ok(row.map(Into::into))
    }

    async fn consume_reset_token(
        &self,
        user_id: i64,
        token: &str,
        hashed_password: &str,
    ) -> Result<bool, AuthError> {
        // guarded by the token value: of two concurrent confirms only one
        // matches the row
        let result = sqlx::query(
            "UPDATE users SET hashed_password = $1, reset_token = NULL, \
             reset_token_expiry = NULL, updated_at = NOW() \
             WHERE id = $2 AND reset_token = $3",
        )
        .bind(hashed_password)
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("consume_reset_token", e))?;

        Ok(result.rows_affected() > 0)
    }
}
