//! Callback endpoint for the authentication middleware.
//!
//! The middleware finishes the provider handshake (code exchange, token and
//! signature checks) and then posts the verified identity here. The response
//! tells it which local user to start a session for.

use crate::error::AppError;
use crate::models::auth_payload::CallbackBody;
use crate::services::identity_service::Resolution;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// `POST /auth/{provider}/callback`
///
/// | Outcome  | Status | Body                         |
/// |----------|--------|------------------------------|
/// | Created  | 201    | user                         |
/// | Existing | 200    | user                         |
/// | Rejected | 422    | `{"errors": [...], "user"}`  |
pub async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Json(body): Json<CallbackBody>,
) -> Result<Response, AppError> {
    let payload = body.into_payload(provider);
    let resolution = state.identity_resolver.resolve(&payload).await?;

    let response = match resolution {
        Resolution::Created(user) => (StatusCode::CREATED, Json(json!({ "user": user }))),
        Resolution::Existing(user) => (StatusCode::OK, Json(json!({ "user": user }))),
        Resolution::Rejected { user, errors } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "errors": errors.full_messages(),
                "user": {
                    "provider": user.provider,
                    "uid": user.uid,
                    "email": user.email,
                    "full_name": user.full_name,
                    "avatar_url": user.avatar_url,
                },
            })),
        ),
    };

    Ok(response.into_response())
}
