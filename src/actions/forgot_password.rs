use crate::audit;
use crate::mailer::{Mailer, ResetEmail};
use crate::repository::{
    AuditAction, AuditLogRepository, ClientInfo, NewAuditEntry, UserRepository,
};
use crate::token::ResetTokenIssuer;
use crate::validators::{normalize_email, validate_email};
use crate::AuthError;

/// The reset-request flow. The outcome is identical for known and
/// unknown emails: a generic `Ok(())`. Only a real delivery failure for
/// an existing account surfaces as an error, because silently dropping
/// the email would strand the user.
pub struct ForgotPasswordAction<U, A, M>
where
    U: UserRepository,
    A: AuditLogRepository,
    M: Mailer,
{
    user_repository: U,
    audit_log: A,
    mailer: M,
    issuer: ResetTokenIssuer,
}

impl<U: UserRepository, A: AuditLogRepository, M: Mailer> ForgotPasswordAction<U, A, M> {
    pub fn new(user_repository: U, audit_log: A, mailer: M) -> Self {
        Self::with_issuer(user_repository, audit_log, mailer, ResetTokenIssuer::default())
    }

    pub fn with_issuer(
        user_repository: U,
        audit_log: A,
        mailer: M,
        issuer: ResetTokenIssuer,
    ) -> Self {
        Self {
            user_repository,
            audit_log,
            mailer,
            issuer,
        }
    }

    /// Issuing a new token overwrites any previous one, so at most one
    /// reset token is live per account.
    #[tracing::instrument(name = "forgot_password", skip_all, err)]
    pub async fn execute(&self, email: &str, client: &ClientInfo) -> Result<(), AuthError> {
        let email = normalize_email(email);
        validate_email(&email)?;

        let user = match self.user_repository.find_by_email(&email).await? {
            Some(user) if user.is_active => user,
            _ => {
                audit::record(
                    &self.audit_log,
                    NewAuditEntry::new(AuditAction::PasswordReset, false, client)
                        .email(&email)
                        .detail(serde_json::json!({ "reason": "unknown_or_inactive_account" })),
                )
                .await;
                return Ok(());
            }
        };

        let issued = self.issuer.issue();
        self.user_repository
            .set_reset_token(user.id, issued.token.expose_secret(), issued.expires_at)
            .await?;

        if let Err(err) = self
            .mailer
            .send_reset_email(ResetEmail {
                to: user.email.clone(),
                first_name: user.first_name.clone(),
                token: issued.token.expose_secret().to_owned(),
            })
            .await
        {
            audit::record(
                &self.audit_log,
                NewAuditEntry::new(AuditAction::PasswordReset, false, client)
                    .user(user.id)
                    .email(&user.email)
                    .detail(serde_json::json!({ "reason": "delivery_failed" })),
            )
            .await;
            return Err(err);
        }

        audit::record(
            &self.audit_log,
            NewAuditEntry::new(AuditAction::PasswordReset, true, client)
                .user(user.id)
                .email(&user.email)
                .detail(serde_json::json!({ "stage": "requested" })),
        )
        .await;

        Ok(())
    }
}
