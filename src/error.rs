/*
 * Responsibility
 * - Application-wide AppError
 * - IntoResponse (HTTP status / JSON error body)
 * - Uniform conversion of service/repo errors
 *
 * Token failure reasons (invalid vs expired) never reach this type: the authenticator
 * collapses them into AuthenticationRequired.
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::RepoError;
use crate::services::auth::session::SessionError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{code}: {message}")]
    BadRequest { code: &'static str, message: String },
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("{message}")]
    Conflict { message: String },
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            AppError::AuthenticationRequired => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "authentication required".into(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "invalid credentials".into(),
            ),
            AppError::Conflict { message } => (StatusCode::CONFLICT, "CONFLICT", message),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = ?e, "identity store failure");
        AppError::Internal
    }
}

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::InvalidInput(msg) => AppError::bad_request("INVALID_INPUT", msg),
            SessionError::AlreadyExists => {
                AppError::conflict("account with this email or username already exists")
            }
            SessionError::InvalidCredentials => AppError::InvalidCredentials,
            SessionError::Password(_)
            | SessionError::Token(_)
            | SessionError::Store(_)
            | SessionError::Worker(_) => {
                tracing::error!(error = ?e, "session operation failed");
                AppError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_errors_map_to_statuses() {
        let cases = [
            (SessionError::InvalidInput("x"), StatusCode::BAD_REQUEST),
            (SessionError::AlreadyExists, StatusCode::CONFLICT),
            (SessionError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (
                SessionError::Store(RepoError::Conflict),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                SessionError::Store(RepoError::Db(sqlx::Error::PoolTimedOut)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn store_errors_are_500() {
        let err = AppError::from(RepoError::Db(sqlx::Error::PoolTimedOut));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn authentication_required_is_401() {
        assert_eq!(
            AppError::AuthenticationRequired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }
}
