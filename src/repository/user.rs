use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Business role attached to a user. Module-level permission checks map
/// these onto allow/deny decisions outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Management,
    Sales,
    Procurement,
    Inventory,
    Payroll,
    Accounting,
    Qhse,
    Hr,
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Management => "management",
            Role::Sales => "sales",
            Role::Procurement => "procurement",
            Role::Inventory => "inventory",
            Role::Payroll => "payroll",
            Role::Accounting => "accounting",
            Role::Qhse => "qhse",
            Role::Hr => "hr",
            Role::Staff => "staff",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "management" => Some(Role::Management),
            "sales" => Some(Role::Sales),
            "procurement" => Some(Role::Procurement),
            "inventory" => Some(Role::Inventory),
            "payroll" => Some(Role::Payroll),
            "accounting" => Some(Role::Accounting),
            "qhse" => Some(Role::Qhse),
            "hr" => Some(Role::Hr),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Staff
    }
}

/// A credential record. `email` is always stored normalized (lowercase);
/// `reset_token` and `reset_token_expiry` are both null or both set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub is_active: bool,
    pub email_verified: bool,
    #[serde(skip_serializing)]
    pub reset_token: Option<String>,
    #[serde(skip_serializing)]
    pub reset_token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields persisted at signup. The email must already be normalized and
/// the password already hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub hashed_password: String,
}

impl User {
    /// Test fixture used by the mock repository and the test suites.
    pub fn mock_from_credentials(email: &str, hashed_password: &str) -> Self {
        let now = Utc::now();
        User {
            id: 1,
            email: email.to_owned(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            role: Role::Staff,
            hashed_password: hashed_password.to_owned(),
            is_active: true,
            email_verified: false,
            reset_token: None,
            reset_token_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn mock_from_email(email: &str) -> Self {
        Self::mock_from_credentials(email, "fakehashedpassword")
    }
}

#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;

    /// Lookup by normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn create(&self, new_user: NewUser) -> Result<User, AuthError>;

    async fn update_password(&self, user_id: i64, hashed_password: &str) -> Result<(), AuthError>;

    /// Stores a reset token on the user row, overwriting any previous one.
    async fn set_reset_token(
        &self,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// The combined reset-confirm predicate: stored token equals `token`,
    /// expiry is after `now`, and the account is active. A miss on any of
    /// the three returns `None`.
    async fn find_by_valid_reset_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, AuthError>;

    /// Sets the new password hash and clears both reset-token fields in a
    /// single update guarded by the token value. Returns `false` when the
    /// token no longer matches (already consumed or overwritten), making
    /// consumption single-use under concurrent confirms.
    async fn consume_reset_token(
        &self,
        user_id: i64,
        token: &str,
        hashed_password: &str,
    ) -> Result<bool, AuthError>;
}
