//! Mail delivery seam.
//!
//! The core never builds SMTP connections or templates; it hands the
//! reset token to a [`Mailer`] and reacts to the result. Reset-request is
//! the only flow that sends mail, and it surfaces delivery failures to
//! the caller instead of pretending the mail went out.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::AuthError;

/// A password reset email about to be delivered.
#[derive(Debug, Clone)]
pub struct ResetEmail {
    pub to: String,
    pub first_name: String,
    /// The raw token; the delivery layer embeds it in a link.
    pub token: String,
}

/// Confirmation sent after a successful password change. Delivery is
/// best-effort; the change has already committed when this goes out.
#[derive(Debug, Clone)]
pub struct PasswordChangedEmail {
    pub to: String,
    pub first_name: String,
}

#[async_trait]
pub trait Mailer {
    async fn send_reset_email(&self, email: ResetEmail) -> Result<(), AuthError>;

    async fn send_password_changed_email(
        &self,
        email: PasswordChangedEmail,
    ) -> Result<(), AuthError>;
}

/// Development mailer that logs instead of sending. The token itself is
/// never written to the log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_reset_email(&self, email: ResetEmail) -> Result<(), AuthError> {
        log::info!(target: "mailer", "password reset email queued for {}", email.to);
        Ok(())
    }

    async fn send_password_changed_email(
        &self,
        email: PasswordChangedEmail,
    ) -> Result<(), AuthError> {
        log::info!(target: "mailer", "password changed email queued for {}", email.to);
        Ok(())
    }
}

/// Test mailer capturing outgoing messages, optionally failing every send.
#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<ResetEmail>>>,
    pub notices: Arc<Mutex<Vec<PasswordChangedEmail>>>,
    pub fail_sends: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send_reset_email(&self, email: ResetEmail) -> Result<(), AuthError> {
        if self.fail_sends {
            return Err(AuthError::EmailDelivery("smtp unavailable".to_owned()));
        }
        self.sent
            .lock()
            .map_err(|_| AuthError::EmailDelivery("mailer poisoned".to_owned()))?
            .push(email);
        Ok(())
    }

    async fn send_password_changed_email(
        &self,
        email: PasswordChangedEmail,
    ) -> Result<(), AuthError> {
        if self.fail_sends {
            return Err(AuthError::EmailDelivery("smtp unavailable".to_owned()));
        }
        self.notices
            .lock()
            .map_err(|_| AuthError::EmailDelivery("mailer poisoned".to_owned()))?
            .push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_mailer_captures_sends() {
        let mailer = MockMailer::new();
        mailer
            .send_reset_email(ResetEmail {
                to: "user@example.com".to_owned(),
                first_name: "Test".to_owned(),
                token: "abc123".to_owned(),
            })
            .await
            .unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "user@example.com");
    }

    #[tokio::test]
    async fn test_failing_mailer_reports_delivery_error() {
        let mailer = MockMailer::failing();
        let err = mailer
            .send_reset_email(ResetEmail {
                to: "user@example.com".to_owned(),
                first_name: "Test".to_owned(),
                token: "abc123".to_owned(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::EmailDelivery(_)));
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
