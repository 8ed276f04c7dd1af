use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::AppError;
use super::routes::AppState;
use crate::mailer::Mailer;
use crate::repository::{ClientInfo, User};
use crate::session::{Session, SessionStore};
use crate::{AuditLogRepository, AuthError, NotificationRepository, UserRepository};

/// Resolves the bearer token through the session store and loads the
/// owning user. Keeps the session around so logout can revoke it.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub session: Session,
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

/// Client metadata for audit entries, read from the usual proxy headers.
pub fn extract_client_info(headers: &HeaderMap) -> ClientInfo {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_owned());
    let user_agent = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);

    ClientInfo {
        ip_address,
        user_agent,
    }
}

impl<U, A, N, S, M> FromRequestParts<AppState<U, A, N, S, M>> for CurrentUser
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, A, N, S, M>,
    ) -> Result<Self, Self::Rejection> {
        let token =
            extract_bearer_token(&parts.headers).ok_or(AppError(AuthError::Unauthenticated))?;

        let session = state
            .sessions
            .resolve(&token)
            .await
            .map_err(AppError)?
            .ok_or(AppError(AuthError::Unauthenticated))?;

        let user = state
            .user_repo
            .find_by_id(session.user_id)
            .await
            .map_err(AppError)?
            .ok_or(AppError(AuthError::UserNotFound))?;

        if !user.is_active {
            return Err(AppError(AuthError::Unauthenticated));
        }

        Ok(CurrentUser { user, session })
    }
}
