/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - route ごとの認可 (ensure_*) を route_layer で掛ける
 * - authenticate (AuthCtx 付与) は app.rs 側で v1 全体に掛ける
 */
use axum::{
    Router,
    middleware::from_fn,
    routing::get,
};

use crate::middleware::auth::{ensure_admin, ensure_logged_in, ensure_self_or_admin};
use crate::state::AppState;

use crate::api::v1::handlers::{
    health::health,
    users::{delete_user, get_user, list_users, me, update_user},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/me",
            get(me).route_layer(from_fn(ensure_logged_in)),
        )
        .route(
            "/users",
            get(list_users).route_layer(from_fn(ensure_admin)),
        )
        .route(
            "/users/{username}",
            get(get_user)
                .patch(update_user)
                .delete(delete_user)
                .route_layer(from_fn(ensure_self_or_admin)),
        )
}
