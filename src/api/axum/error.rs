use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::ErrorResponse;
use crate::AuthError;

/// Converts `AuthError` into an HTTP response with the default status
/// mapping. Handlers that need a flow-specific status (change-password
/// treats a wrong current password as 400, not 401) match on the error
/// themselves.
#[derive(Debug)]
pub struct AppError(pub AuthError);

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        Self(err)
    }
}

pub(super) fn default_status(err: &AuthError) -> StatusCode {
    match err {
        AuthError::Validation(_) | AuthError::InvalidOrExpiredToken => StatusCode::BAD_REQUEST,
        AuthError::InvalidCredentials | AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
        AuthError::Forbidden => StatusCode::FORBIDDEN,
        AuthError::NotFound | AuthError::UserNotFound => StatusCode::NOT_FOUND,
        AuthError::EmailTaken => StatusCode::CONFLICT,
        AuthError::AccountLocked => StatusCode::TOO_MANY_REQUESTS,
        AuthError::PasswordHashError
        | AuthError::EmailDelivery(_)
        | AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = default_status(&self.0);
        (status, Json(ErrorResponse::from(self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_mapping() {
        assert_eq!(
            default_status(&AuthError::EmailTaken),
            StatusCode::CONFLICT
        );
        assert_eq!(
            default_status(&AuthError::AccountLocked),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            default_status(&AuthError::InvalidOrExpiredToken),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            default_status(&AuthError::InvalidCredentials),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(default_status(&AuthError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            default_status(&AuthError::EmailDelivery("smtp".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
