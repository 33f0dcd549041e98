/*
 * Responsibility
 * - /users 系 handler (list / get / partial update / delete) と /me
 * - 認可は routes 側の route_layer (ensure_*) で済んでいる前提
 * - Path/Json を extractor で受け、DTO validation → repo 呼び出し
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::users::{UpdateUserRequest, UserResponse},
        extractors::AuthCtxExtractor,
    },
    error::AppError,
    repos::user_repo,
    services::auth::Principal,
    state::AppState,
};

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, AppError> {
    let rows = user_repo::list(&state.db).await?;

    Ok(Json(rows.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, AppError> {
    let row = user_repo::get(&state.db, &username)
        .await?
        .ok_or(AppError::not_found("user"))?;

    Ok(Json(row.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_BODY", msg))?;

    let changes = req.into_changes();

    let row = user_repo::update(&state.db, &username, &changes)
        .await?
        .ok_or(AppError::not_found("user"))?;

    tracing::info!(username = %row.username, fields = changes.len(), "user updated");

    Ok(Json(row.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<StatusCode, AppError> {
    if user_repo::delete(&state.db, &username).await? {
        tracing::info!(%username, "user deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("user"))
    }
}

/// 呼び出し元の principal (トークンの claims) をそのまま返す
pub async fn me(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Result<Json<Principal>, AppError> {
    ctx.principal()
        .cloned()
        .map(Json)
        .ok_or(AppError::Unauthorized)
}
