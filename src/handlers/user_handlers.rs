use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let user = state.user_service.get_user(id).await?;
    Ok(Json(json!({ "user": user })))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Value>, AppError> {
    let users = state
        .user_service
        .list_users(query.limit, query.offset)
        .await?;
    let total = state.user_service.count_users().await?;

    Ok(Json(json!({ "users": users, "total": total })))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
