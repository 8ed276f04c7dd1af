use crate::audit;
use crate::crypto::{BcryptHasher, PasswordHasher, SecretString};
use crate::mailer::{Mailer, PasswordChangedEmail};
use crate::repository::{
    AuditAction, AuditLogRepository, ClientInfo, NewAuditEntry, UserRepository,
};
use crate::validators::validate_password;
use crate::AuthError;

/// Authenticated password change. The caller identity comes from the
/// session layer; this action re-verifies the current password before
/// touching anything. The confirmation mail at the end is best-effort:
/// the change has already committed, so a send failure is logged and
/// swallowed.
pub struct ChangePasswordAction<U, A, M, H = BcryptHasher>
where
    U: UserRepository,
    A: AuditLogRepository,
    M: Mailer,
{
    user_repository: U,
    audit_log: A,
    mailer: M,
    hasher: H,
}

impl<U: UserRepository, A: AuditLogRepository, M: Mailer> ChangePasswordAction<U, A, M, BcryptHasher> {
    pub fn new(user_repository: U, audit_log: A, mailer: M) -> Self {
        Self {
            user_repository,
            audit_log,
            mailer,
            hasher: BcryptHasher::default(),
        }
    }
}

impl<U, A, M, H> ChangePasswordAction<U, A, M, H>
where
    U: UserRepository,
    A: AuditLogRepository,
    M: Mailer,
    H: PasswordHasher,
{
    pub fn with_hasher(user_repository: U, audit_log: A, mailer: M, hasher: H) -> Self {
        Self {
            user_repository,
            audit_log,
            mailer,
            hasher,
        }
    }

    #[tracing::instrument(name = "change_password", skip_all, err)]
    pub async fn execute(
        &self,
        user_id: i64,
        current_password: &SecretString,
        new_password: &SecretString,
        client: &ClientInfo,
    ) -> Result<(), AuthError> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !self
            .hasher
            .verify(current_password.expose_secret(), &user.hashed_password)?
        {
            audit::record(
                &self.audit_log,
                NewAuditEntry::new(AuditAction::PasswordChange, false, client)
                    .user(user.id)
                    .email(&user.email)
                    .detail(serde_json::json!({ "reason": "wrong_current_password" })),
            )
            .await;
            return Err(AuthError::InvalidCredentials);
        }

        validate_password(new_password.expose_secret())?;

        let hashed = self.hasher.hash(new_password.expose_secret())?;
        self.user_repository
            .update_password(user.id, &hashed)
            .await?;

        audit::record(
            &self.audit_log,
            NewAuditEntry::new(AuditAction::PasswordChange, true, client)
                .user(user.id)
                .email(&user.email),
        )
        .await;

        if let Err(err) = self
            .mailer
            .send_password_changed_email(PasswordChangedEmail {
                to: user.email.clone(),
                first_name: user.first_name.clone(),
            })
            .await
        {
            log::warn!(target: "auth", "password changed confirmation mail failed: {err}");
        }

        Ok(())
    }
}
