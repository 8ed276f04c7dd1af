//! Central configuration for the auth core.
//!
//! Every policy knob that would otherwise be a magic number lives here:
//! reset token lifetime, lockout thresholds, hashing cost, pagination.
//!
//! # Example
//!
//! ```rust
//! use anchorage::config::{AuthConfig, LockoutConfig};
//! use chrono::Duration;
//!
//! let config = AuthConfig {
//!     lockout: LockoutConfig {
//!         max_failed_attempts: 3,
//!         window: Duration::minutes(30),
//!     },
//!     ..Default::default()
//! };
//! ```

use chrono::Duration;

/// Top-level configuration consumed by the actions and the HTTP layer.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// How long password reset tokens remain valid.
    ///
    /// Default: 1 hour
    pub reset_token_expiry: Duration,

    /// How long sessions established on login remain valid.
    ///
    /// Default: 7 days
    pub session_expiry: Duration,

    /// bcrypt work factor used when hashing passwords.
    ///
    /// Default: 12
    pub bcrypt_cost: u32,

    /// Account lockout policy.
    pub lockout: LockoutConfig,

    /// Maximum number of notifications returned per listing.
    ///
    /// Default: 50
    pub notifications_page_size: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            reset_token_expiry: Duration::hours(1),
            session_expiry: Duration::days(7),
            bcrypt_cost: 12,
            lockout: LockoutConfig::default(),
            notifications_page_size: 50,
        }
    }
}

impl AuthConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stricter settings: shorter token/session lifetimes, tighter lockout.
    pub fn strict() -> Self {
        Self {
            reset_token_expiry: Duration::minutes(30),
            session_expiry: Duration::hours(12),
            bcrypt_cost: 12,
            lockout: LockoutConfig {
                max_failed_attempts: 3,
                window: Duration::minutes(30),
            },
            notifications_page_size: 50,
        }
    }
}

/// Lockout is derived from the audit trail, never stored: an account is
/// locked while the trailing `window` contains at least
/// `max_failed_attempts` failed logins, and unlocks by itself as entries
/// age out.
#[derive(Debug, Clone)]
pub struct LockoutConfig {
    /// Failed logins within the window before the account locks.
    ///
    /// Default: 5
    pub max_failed_attempts: u32,

    /// Trailing window scanned for failed logins.
    ///
    /// Default: 15 minutes
    pub window: Duration,
}

impl Default for LockoutConfig {
    fn default() -> Self {
        Self {
            max_failed_attempts: 5,
            window: Duration::minutes(15),
        }
    }
}
