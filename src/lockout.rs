//! Lockout policy derived from the audit trail.
//!
//! No locked flag is ever stored. An account is locked exactly while the
//! trailing window holds at least the configured number of LOGIN_FAILED
//! entries for that email; once entries age past the window the account
//! unlocks without any unlock write.

use chrono::Utc;

use crate::config::LockoutConfig;
use crate::repository::AuditLogRepository;
use crate::AuthError;

/// Read-side lockout check. Cheap to construct; holds only the config.
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    config: LockoutConfig,
}

impl LockoutPolicy {
    pub fn new(config: LockoutConfig) -> Self {
        Self { config }
    }

    /// Counts failed logins for `email` inside the trailing window.
    pub async fn recent_failures<A>(&self, audit_log: &A, email: &str) -> Result<u32, AuthError>
    where
        A: AuditLogRepository,
    {
        let since = Utc::now() - self.config.window;
        audit_log.count_failed_logins(email, since).await
    }

    /// True while the account is locked. Recomputed on every call, so the
    /// verdict tracks the sliding window with no state to reset.
    pub async fn is_locked<A>(&self, audit_log: &A, email: &str) -> Result<bool, AuthError>
    where
        A: AuditLogRepository,
    {
        let failures = self.recent_failures(audit_log, email).await?;
        Ok(failures >= self.config.max_failed_attempts)
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(LockoutConfig::default())
    }
}
