//! Password reset token issuance and validation.
//!
//! Tokens are opaque to callers: 256 bits from the OS RNG, hex-encoded,
//! valid for a fixed interval after issuance. One live token per user;
//! issuing a new one overwrites the previous. Consumption (a successful
//! reset-confirm) clears the stored token; expiry is never stored as a
//! state of its own, it is evaluated lazily at validation time.

use chrono::{DateTime, Duration, Utc};

use crate::crypto::{generate_reset_token, SecretString};

/// A freshly issued reset token together with its expiry.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: SecretString,
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Issues reset tokens with a fixed time-to-live.
#[derive(Debug, Clone)]
pub struct ResetTokenIssuer {
    ttl: Duration,
}

impl Default for ResetTokenIssuer {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(1),
        }
    }
}

impl ResetTokenIssuer {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }

    pub fn issue(&self) -> IssuedToken {
        IssuedToken {
            token: SecretString::new(generate_reset_token()),
            expires_at: Utc::now() + self.ttl,
        }
    }
}

/// The validation predicate for a stored token: exact equality and an
/// expiry strictly in the future. The in-memory store evaluates it
/// directly; the SQL backend expresses the same clause in its WHERE. The
/// account-active check lives with the credential store lookup, not here.
pub fn validate(
    candidate: &str,
    stored: &str,
    stored_expiry: DateTime<Utc>,
    now: DateTime<Utc>,
) -> bool {
    candidate == stored && now < stored_expiry
}
