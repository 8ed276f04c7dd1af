use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use crate::config::AuthConfig;
use crate::mailer::Mailer;
use crate::session::SessionStore;
use crate::{AuditLogRepository, NotificationRepository, UserRepository};

#[derive(Clone)]
pub struct AppState<U, A, N, S, M> {
    pub user_repo: U,
    pub audit_log: A,
    pub notification_repo: N,
    pub sessions: S,
    pub mailer: M,
    pub config: AuthConfig,
}

/// The full surface: auth flows plus the notification inbox and the
/// audit-log listing.
pub fn auth_routes<U, A, N, S, M>() -> Router<AppState<U, A, N, S, M>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    Router::new().merge(public_routes()).merge(private_routes())
}

pub fn public_routes<U, A, N, S, M>() -> Router<AppState<U, A, N, S, M>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/signup", post(handlers::signup::<U, A, N, S, M>))
        .route("/login", post(handlers::login::<U, A, N, S, M>))
        .route(
            "/reset-password",
            post(handlers::forgot_password::<U, A, N, S, M>),
        )
        .route(
            "/reset-password/confirm",
            post(handlers::reset_password::<U, A, N, S, M>),
        )
}

pub fn private_routes<U, A, N, S, M>() -> Router<AppState<U, A, N, S, M>>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/logout", post(handlers::logout::<U, A, N, S, M>))
        .route(
            "/change-password",
            post(handlers::change_password::<U, A, N, S, M>),
        )
        .route(
            "/notifications",
            get(handlers::list_notifications::<U, A, N, S, M>)
                .post(handlers::create_notification::<U, A, N, S, M>),
        )
        .route(
            "/notifications/{id}",
            axum::routing::patch(handlers::update_notification::<U, A, N, S, M>)
                .delete(handlers::delete_notification::<U, A, N, S, M>),
        )
        .route("/audit-log", get(handlers::list_audit_log::<U, A, N, S, M>))
}
