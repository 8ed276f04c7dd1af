use crate::audit;
use crate::config::AuthConfig;
use crate::crypto::{BcryptHasher, PasswordHasher, SecretString};
use crate::lockout::LockoutPolicy;
use crate::repository::{
    AuditAction, AuditLogRepository, ClientInfo, NewAuditEntry, User, UserRepository,
};
use crate::session::{Session, SessionStore};
use crate::validators::normalize_email;
use crate::AuthError;

/// The login flow: lockout check, credential verification, session
/// creation, audit entry. Unknown email, wrong password and deactivated
/// account all collapse into [`AuthError::InvalidCredentials`].
pub struct LoginAction<U, A, S, H = BcryptHasher>
where
    U: UserRepository,
    A: AuditLogRepository,
    S: SessionStore,
{
    user_repository: U,
    audit_log: A,
    sessions: S,
    hasher: H,
    config: AuthConfig,
}

impl<U: UserRepository, A: AuditLogRepository, S: SessionStore> LoginAction<U, A, S, BcryptHasher> {
    pub fn new(user_repository: U, audit_log: A, sessions: S) -> Self {
        Self::with_config(user_repository, audit_log, sessions, AuthConfig::default())
    }

    pub fn with_config(user_repository: U, audit_log: A, sessions: S, config: AuthConfig) -> Self {
        Self {
            user_repository,
            audit_log,
            sessions,
            hasher: BcryptHasher::default(),
            config,
        }
    }
}

impl<U, A, S, H> LoginAction<U, A, S, H>
where
    U: UserRepository,
    A: AuditLogRepository,
    S: SessionStore,
    H: PasswordHasher,
{
    pub fn with_hasher(
        user_repository: U,
        audit_log: A,
        sessions: S,
        hasher: H,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repository,
            audit_log,
            sessions,
            hasher,
            config,
        }
    }

    /// The lockout verdict is read before the password is even looked
    /// at, so a locked account leaks nothing about whether the password
    /// was right. Attempts made while locked are recorded as
    /// ACCOUNT_LOCKED, not LOGIN_FAILED, so they do not extend the lock.
    #[tracing::instrument(name = "login", skip_all, err)]
    pub async fn execute(
        &self,
        email: &str,
        password: &SecretString,
        client: &ClientInfo,
    ) -> Result<(User, Session), AuthError> {
        let email = normalize_email(email);
        let policy = LockoutPolicy::new(self.config.lockout.clone());

        if policy.is_locked(&self.audit_log, &email).await? {
            audit::record(
                &self.audit_log,
                NewAuditEntry::new(AuditAction::AccountLocked, false, client).email(&email),
            )
            .await;
            return Err(AuthError::AccountLocked);
        }

        let user = self.user_repository.find_by_email(&email).await?;

        let verified = match &user {
            Some(user) if user.is_active => self
                .hasher
                .verify(password.expose_secret(), &user.hashed_password)?,
            _ => false,
        };

        if !verified {
            let mut entry =
                NewAuditEntry::new(AuditAction::LoginFailed, false, client).email(&email);
            if let Some(user) = &user {
                entry = entry.user(user.id);
            }
            audit::record(&self.audit_log, entry).await;

            // a lock established by this very failure gets its own entry
            if policy.is_locked(&self.audit_log, &email).await? {
                let failures = policy.recent_failures(&self.audit_log, &email).await?;
                audit::record(
                    &self.audit_log,
                    NewAuditEntry::new(AuditAction::AccountLocked, false, client)
                        .email(&email)
                        .detail(serde_json::json!({ "failed_attempts": failures })),
                )
                .await;
            }

            return Err(AuthError::InvalidCredentials);
        }

        let user = user.ok_or(AuthError::InvalidCredentials)?;
        let session = self
            .sessions
            .create(user.id, self.config.session_expiry)
            .await?;

        audit::record(
            &self.audit_log,
            NewAuditEntry::new(AuditAction::Login, true, client)
                .user(user.id)
                .email(&user.email),
        )
        .await;

        Ok((user, session))
    }
}
