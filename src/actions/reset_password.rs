use crate::crypto::{BcryptHasher, PasswordHasher, SecretString};
use crate::audit;
use crate::repository::{
    AuditAction, AuditLogRepository, ClientInfo, NewAuditEntry, UserRepository,
};
use crate::validators::{validate_password, ValidationError};
use crate::AuthError;

/// The reset-confirm flow. Wrong token, expired token and inactive
/// account all collapse into [`AuthError::InvalidOrExpiredToken`];
/// consumption is guarded by the token value so a token works exactly
/// once even under concurrent confirms.
pub struct ResetPasswordAction<U, A, H = BcryptHasher>
where
    U: UserRepository,
    A: AuditLogRepository,
{
    user_repository: U,
    audit_log: A,
    hasher: H,
}

impl<U: UserRepository, A: AuditLogRepository> ResetPasswordAction<U, A, BcryptHasher> {
    pub fn new(user_repository: U, audit_log: A) -> Self {
        Self {
            user_repository,
            audit_log,
            hasher: BcryptHasher::default(),
        }
    }
}

impl<U: UserRepository, A: AuditLogRepository, H: PasswordHasher> ResetPasswordAction<U, A, H> {
    pub fn with_hasher(user_repository: U, audit_log: A, hasher: H) -> Self {
        Self {
            user_repository,
            audit_log,
            hasher,
        }
    }

    #[tracing::instrument(name = "reset_password", skip_all, err)]
    pub async fn execute(
        &self,
        token: &str,
        new_password: &SecretString,
        client: &ClientInfo,
    ) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(ValidationError::TokenEmpty.into());
        }
        validate_password(new_password.expose_secret())?;

        let user = match self
            .user_repository
            .find_by_valid_reset_token(token, chrono::Utc::now())
            .await?
        {
            Some(user) => user,
            None => {
                // no owner to attribute the attempt to
                audit::record(
                    &self.audit_log,
                    NewAuditEntry::new(AuditAction::PasswordReset, false, client)
                        .email("unknown")
                        .detail(serde_json::json!({ "reason": "invalid_or_expired_token" })),
                )
                .await;
                return Err(AuthError::InvalidOrExpiredToken);
            }
        };

        let hashed = self.hasher.hash(new_password.expose_secret())?;
        let consumed = self
            .user_repository
            .consume_reset_token(user.id, token, &hashed)
            .await?;
        if !consumed {
            // lost the race against another confirm for the same token
            return Err(AuthError::InvalidOrExpiredToken);
        }

        audit::record(
            &self.audit_log,
            NewAuditEntry::new(AuditAction::PasswordReset, true, client)
                .user(user.id)
                .email(&user.email)
                .detail(serde_json::json!({ "stage": "confirmed" })),
        )
        .await;

        Ok(())
    }
}
