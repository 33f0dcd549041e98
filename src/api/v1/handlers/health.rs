/*
 * Responsibility
 * - GET /health (疎通用, 認証不要)
 * - DB に届くかどうかも返す (落ちていても 200 + "db": "unavailable")
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unreachable");
            "unavailable"
        }
    };

    (StatusCode::OK, Json(json!({ "status": "ok", "db": db })))
}
