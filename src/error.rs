use crate::repositories::user_repository::RepositoryError;
use crate::services::{identity_service::IdentityError, user_service::UserServiceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Bridge token is not configured")]
    BridgeDisabled,

    #[error("User not found")]
    UserNotFound,

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("Internal server error")]
    InternalError,

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidPayload(msg) => AppError::Validation(msg),
            IdentityError::UnsupportedProvider(provider) => AppError::UnsupportedProvider(provider),
            IdentityError::RepositoryError(e) => AppError::Repository(e),
            IdentityError::HashingError(_) => AppError::InternalError,
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(err: UserServiceError) -> Self {
        match err {
            UserServiceError::UserNotFound => AppError::UserNotFound,
            UserServiceError::RepositoryError(e) => AppError::Repository(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationFailed => (
                StatusCode::UNAUTHORIZED,
                "Authentication failed".to_string(),
            ),
            AppError::BridgeDisabled => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Identity bridge is not configured".to_string(),
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".to_string()),
            AppError::UnsupportedProvider(provider) => (
                StatusCode::NOT_FOUND,
                format!("Unsupported provider: {}", provider),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Repository(ref e) => {
                tracing::error!("Repository error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        (status, Json(json!({ "error": error_message }))).into_response()
    }
}
