//! HTTP handlers wiring the actions to JSON endpoints.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use super::error::AppError;
use super::middleware::{extract_client_info, CurrentUser};
use super::routes::AppState;
use crate::actions::{
    ChangePasswordAction, ForgotPasswordAction, LoginAction, ResetPasswordAction, SignupAction,
};
use crate::api::{
    AuditLogParams, AuditLogResponse, AuthResponse, ChangePasswordRequest,
    CreateNotificationRequest, DeletedResponse, ErrorResponse, ForgotPasswordRequest,
    LoginRequest, MessageResponse, NotificationListResponse, ResetPasswordRequest, SignupRequest,
    UpdateNotificationRequest, UserResponse,
};
use crate::audit;
use crate::crypto::BcryptHasher;
use crate::mailer::Mailer;
use crate::notifications::NotificationService;
use crate::repository::{AuditAction, AuditQuery, NewAuditEntry, Role};
use crate::session::SessionStore;
use crate::token::ResetTokenIssuer;
use crate::{
    actions, AuditLogRepository, AuthError, NotificationRepository, SecretString, UserRepository,
};

/// Create an account.
///
/// POST /signup
pub async fn signup<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    headers: HeaderMap,
    Json(body): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = SignupAction::with_hasher(
        state.user_repo,
        state.audit_log,
        BcryptHasher::new(state.config.bcrypt_cost),
    );
    let client = extract_client_info(&headers);

    let user = action
        .execute(
            actions::SignupRequest {
                email: body.email,
                password: SecretString::new(body.password),
                first_name: body.first_name,
                last_name: body.last_name,
                role: body.role,
            },
            &client,
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Authenticate and establish a session.
///
/// POST /login
pub async fn login<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = LoginAction::with_hasher(
        state.user_repo,
        state.audit_log,
        state.sessions,
        BcryptHasher::new(state.config.bcrypt_cost),
        state.config.clone(),
    );
    let client = extract_client_info(&headers);
    let password = SecretString::new(body.password);

    let (user, session) = action.execute(&body.email, &password, &client).await?;

    Ok(Json(AuthResponse {
        user: UserResponse::from(user),
        token: SecretString::new(session.id),
        expires_at: session.expires_at,
    }))
}

/// Revoke the current session.
///
/// POST /logout
pub async fn logout<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    headers: HeaderMap,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    state
        .sessions
        .revoke(&current.session.id)
        .await
        .map_err(AppError)?;

    let client = extract_client_info(&headers);
    audit::record(
        &state.audit_log,
        NewAuditEntry::new(AuditAction::Logout, true, &client)
            .user(current.user.id)
            .email(&current.user.email),
    )
    .await;

    Ok(Json(MessageResponse {
        message: "Successfully logged out".to_owned(),
    }))
}

/// Change the current user's password.
///
/// POST /change-password
pub async fn change_password<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    headers: HeaderMap,
    current: CurrentUser,
    Json(body): Json<ChangePasswordRequest>,
) -> impl IntoResponse
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = ChangePasswordAction::with_hasher(
        state.user_repo,
        state.audit_log,
        state.mailer,
        BcryptHasher::new(state.config.bcrypt_cost),
    );
    let client = extract_client_info(&headers);
    let current_password = SecretString::new(body.current_password);
    let new_password = SecretString::new(body.new_password);

    match action
        .execute(current.user.id, &current_password, &new_password, &client)
        .await
    {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "Password changed successfully".to_owned(),
            }),
        )
            .into_response(),
        Err(err) => {
            // a wrong current password is a bad request here, not a
            // failed authentication: the session itself is valid
            let status = match &err {
                AuthError::InvalidCredentials => StatusCode::BAD_REQUEST,
                other => super::error::default_status(other),
            };
            (status, Json(ErrorResponse::from(err))).into_response()
        }
    }
}

/// Request a password reset token.
///
/// POST /reset-password
pub async fn forgot_password<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    headers: HeaderMap,
    Json(body): Json<ForgotPasswordRequest>,
) -> impl IntoResponse
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = ForgotPasswordAction::with_issuer(
        state.user_repo,
        state.audit_log,
        state.mailer,
        ResetTokenIssuer::new(state.config.reset_token_expiry),
    );
    let client = extract_client_info(&headers);

    match action.execute(&body.email, &client).await {
        // the same body whether or not the account exists
        Ok(()) | Err(AuthError::Validation(_)) => (
            StatusCode::OK,
            Json(MessageResponse {
                message: "If an account exists for this email, a reset link has been sent"
                    .to_owned(),
            }),
        )
            .into_response(),
        Err(err) => AppError(err).into_response(),
    }
}

/// Complete a password reset with a token.
///
/// POST /reset-password/confirm
pub async fn reset_password<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    headers: HeaderMap,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let action = ResetPasswordAction::with_hasher(
        state.user_repo,
        state.audit_log,
        BcryptHasher::new(state.config.bcrypt_cost),
    );
    let client = extract_client_info(&headers);
    let password = SecretString::new(body.password);

    action.execute(&body.token, &password, &client).await?;

    Ok(Json(MessageResponse {
        message: "Password has been reset successfully".to_owned(),
    }))
}

/// List the caller's notifications with an unread count.
///
/// GET /notifications
pub async fn list_notifications<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    current: CurrentUser,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let service = NotificationService::new(state.config.notifications_page_size);
    let page = service
        .list(&state.notification_repo, current.user.id)
        .await?;

    Ok(Json(NotificationListResponse {
        notifications: page.notifications,
        unread_count: page.unread_count,
    }))
}

/// Create a notification, for the caller or a named target user.
///
/// POST /notifications
pub async fn create_notification<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    current: CurrentUser,
    Json(body): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let service = NotificationService::new(state.config.notifications_page_size);
    let target = body.target_user_id.unwrap_or(current.user.id);

    let notification = service
        .create(
            &state.notification_repo,
            target,
            &body.title,
            &body.message,
            &body.kind,
            body.module,
            body.related_id,
        )
        .await?;

    Ok(Json(notification))
}

/// Update the read flag on an owned notification.
///
/// PATCH /notifications/{id}
pub async fn update_notification<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    current: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateNotificationRequest>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let service = NotificationService::new(state.config.notifications_page_size);
    let notification = service
        .set_read(&state.notification_repo, id, current.user.id, body.read)
        .await?;

    Ok(Json(notification))
}

/// Delete an owned notification.
///
/// DELETE /notifications/{id}
pub async fn delete_notification<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    let service = NotificationService::new(state.config.notifications_page_size);
    service
        .delete(&state.notification_repo, id, current.user.id)
        .await?;

    Ok(Json(DeletedResponse { id }))
}

/// Query the audit trail. Management only.
///
/// GET /audit-log
pub async fn list_audit_log<U, A, N, S, M>(
    State(state): State<AppState<U, A, N, S, M>>,
    current: CurrentUser,
    Query(params): Query<AuditLogParams>,
) -> Result<impl IntoResponse, AppError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
    A: AuditLogRepository + Clone + Send + Sync + 'static,
    N: NotificationRepository + Clone + Send + Sync + 'static,
    S: SessionStore + Clone + Send + Sync + 'static,
    M: Mailer + Clone + Send + Sync + 'static,
{
    if current.user.role != Role::Management {
        return Err(AppError(AuthError::Forbidden));
    }

    let entries = state
        .audit_log
        .query(AuditQuery {
            user_id: params.user_id,
            email: params.email,
            action: params.action.as_deref().and_then(AuditAction::parse),
            from: params.from,
            to: params.to,
            offset: params.offset.unwrap_or(0).max(0),
            limit: params.limit.unwrap_or(50).clamp(1, 200),
        })
        .await
        .map_err(AppError)?;

    Ok(Json(AuditLogResponse { entries }))
}
