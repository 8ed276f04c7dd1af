use crate::audit;
use crate::crypto::{BcryptHasher, PasswordHasher, SecretString};
use crate::repository::{
    AuditAction, AuditLogRepository, ClientInfo, NewAuditEntry, NewUser, Role, User,
    UserRepository,
};
use crate::validators::{
    normalize_email, validate_email, validate_name, validate_password, ValidationError,
};
use crate::AuthError;

/// Everything a signup needs. `role` is the wire value; a missing role
/// defaults to staff, an unknown one is a validation error.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<String>,
}

pub struct SignupAction<U, A, H = BcryptHasher>
where
    U: UserRepository,
    A: AuditLogRepository,
{
    user_repository: U,
    audit_log: A,
    hasher: H,
}

impl<U: UserRepository, A: AuditLogRepository> SignupAction<U, A, BcryptHasher> {
    pub fn new(user_repository: U, audit_log: A) -> Self {
        Self {
            user_repository,
            audit_log,
            hasher: BcryptHasher::default(),
        }
    }
}

impl<U: UserRepository, A: AuditLogRepository, H: PasswordHasher> SignupAction<U, A, H> {
    pub fn with_hasher(user_repository: U, audit_log: A, hasher: H) -> Self {
        Self {
            user_repository,
            audit_log,
            hasher,
        }
    }

    /// Validates the whole request, reporting every offending field at
    /// once, then creates the account. The duplicate-email check runs
    /// before hashing; the store enforces uniqueness again at insert so
    /// a concurrent duplicate still comes back as [`AuthError::EmailTaken`].
    #[tracing::instrument(name = "signup", skip_all, err)]
    pub async fn execute(
        &self,
        request: SignupRequest,
        client: &ClientInfo,
    ) -> Result<User, AuthError> {
        let mut errors = vec![];

        // validation runs on the normalized form, the same shape every
        // store lookup uses
        let email = normalize_email(&request.email);
        if let Err(e) = validate_email(&email) {
            errors.push(e);
        }
        if let Err(e) = validate_password(request.password.expose_secret()) {
            errors.push(e);
        }
        if let Err(e) = validate_name(
            &request.first_name,
            ValidationError::FirstNameEmpty,
            ValidationError::FirstNameTooLong,
        ) {
            errors.push(e);
        }
        if let Err(e) = validate_name(
            &request.last_name,
            ValidationError::LastNameEmpty,
            ValidationError::LastNameTooLong,
        ) {
            errors.push(e);
        }

        let role = match request.role.as_deref() {
            None => Role::default(),
            Some(s) => match Role::parse(s) {
                Some(role) => role,
                None => {
                    errors.push(ValidationError::RoleUnknown);
                    Role::default()
                }
            },
        };

        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        if self.user_repository.find_by_email(&email).await?.is_some() {
            audit::record(
                &self.audit_log,
                NewAuditEntry::new(AuditAction::LoginFailed, false, client)
                    .email(&email)
                    .detail(serde_json::json!({
                        "context": "signup",
                        "reason": "email_exists",
                    })),
            )
            .await;
            return Err(AuthError::EmailTaken);
        }

        let hashed = self.hasher.hash(request.password.expose_secret())?;
        let user = self
            .user_repository
            .create(NewUser {
                email,
                first_name: request.first_name.trim().to_owned(),
                last_name: request.last_name.trim().to_owned(),
                role,
                hashed_password: hashed,
            })
            .await?;

        audit::record(
            &self.audit_log,
            NewAuditEntry::new(AuditAction::Login, true, client)
                .user(user.id)
                .email(&user.email)
                .detail(serde_json::json!({ "context": "signup" })),
        )
        .await;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{MockAuditLogRepository, MockUserRepository};

    fn request(email: &str) -> SignupRequest {
        SignupRequest {
            email: email.to_owned(),
            password: SecretString::new("securepassword"),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            role: None,
        }
    }

    fn action() -> (
        SignupAction<MockUserRepository, MockAuditLogRepository>,
        MockAuditLogRepository,
    ) {
        let audit_log = MockAuditLogRepository::new();
        let action = SignupAction::with_hasher(
            MockUserRepository::new(),
            audit_log.clone(),
            BcryptHasher::new(4),
        );
        (action, audit_log)
    }

    #[tokio::test]
    async fn test_signup_success() {
        let (signup, audit_log) = action();

        let user = signup
            .execute(request("user@example.com"), &ClientInfo::empty())
            .await
            .unwrap();
        assert_eq!(user.email, "user@example.com");
        assert_eq!(user.role, Role::Staff);
        assert!(user.is_active);
        assert!(!user.email_verified);
        assert_ne!(user.hashed_password, "securepassword");

        let entries = audit_log.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].success);
    }

    #[tokio::test]
    async fn test_signup_normalizes_email() {
        let (signup, _) = action();

        let user = signup
            .execute(request("  User@Example.COM "), &ClientInfo::empty())
            .await
            .unwrap();
        assert_eq!(user.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_signup_duplicate_email() {
        let (signup, audit_log) = action();

        signup
            .execute(request("user@example.com"), &ClientInfo::empty())
            .await
            .unwrap();
        let err = signup
            .execute(request("User@example.com"), &ClientInfo::empty())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::EmailTaken);

        let entries = audit_log.entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].action, AuditAction::LoginFailed);
        assert!(!entries[1].success);
    }

    #[tokio::test]
    async fn test_signup_collects_all_field_errors() {
        let (signup, _) = action();

        let err = signup
            .execute(
                SignupRequest {
                    email: "notanemail".to_owned(),
                    password: SecretString::new("short"),
                    first_name: String::new(),
                    last_name: "User".to_owned(),
                    role: Some("wizard".to_owned()),
                },
                &ClientInfo::empty(),
            )
            .await
            .unwrap_err();

        match err {
            AuthError::Validation(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.contains(&ValidationError::EmailInvalidFormat));
                assert!(errors.contains(&ValidationError::PasswordTooShort));
                assert!(errors.contains(&ValidationError::FirstNameEmpty));
                assert!(errors.contains(&ValidationError::RoleUnknown));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_accepts_explicit_role() {
        let (signup, _) = action();

        let mut req = request("user@example.com");
        req.role = Some("accounting".to_owned());
        let user = signup.execute(req, &ClientInfo::empty()).await.unwrap();
        assert_eq!(user.role, Role::Accounting);
    }
}
