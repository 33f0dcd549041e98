//! Route guards (`route_layer` 用)
//!
//! authenticate が作った AuthCtx を読み、条件を満たさなければ 401 を返す。
//! 判定そのものは `services::auth::policy` にある。

use std::collections::HashMap;

use axum::{
    body::Body,
    extract::Path,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::api::v1::extractors::AuthCtxExtractor;
use crate::error::AppError;
use crate::services::auth::policy;

/// 例：
/// ```ignore
/// .route("/me", get(me).route_layer(middleware::from_fn(guard::ensure_logged_in)))
/// ```
pub async fn ensure_logged_in(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    policy::require_logged_in(&ctx).inspect_err(|_| {
        tracing::debug!(path = %req.uri().path(), "rejected: not logged in");
    })?;

    Ok(next.run(req).await)
}

pub async fn ensure_admin(
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    policy::require_admin(&ctx).inspect_err(|_| {
        tracing::debug!(path = %req.uri().path(), "rejected: admin required");
    })?;

    Ok(next.run(req).await)
}

/// `{username}` の path param と principal.username が一致するか、admin であること。
/// path param は routing 後でないと取れないので、必ず route_layer で掛ける。
pub async fn ensure_self_or_admin(
    Path(params): Path<HashMap<String, String>>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let route_username = params.get("username").map(String::as_str).unwrap_or_default();

    policy::require_self_or_admin(&ctx, route_username).inspect_err(|_| {
        tracing::debug!(
            path = %req.uri().path(),
            route_username,
            "rejected: not the same user or admin"
        );
    })?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::access;
    use crate::services::auth::{
        AuthService,
        access_jwt::test_support::{SECRET, sign},
    };
    use axum::{Router, http::StatusCode, middleware, routing::get};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn ok() -> &'static str {
        "ok"
    }

    fn app() -> Router {
        let routes = Router::new()
            .route(
                "/me",
                get(ok).route_layer(middleware::from_fn(ensure_logged_in)),
            )
            .route(
                "/admin",
                get(ok).route_layer(middleware::from_fn(ensure_admin)),
            )
            .route(
                "/users/{username}",
                get(ok).route_layer(middleware::from_fn(ensure_self_or_admin)),
            );

        access::apply(routes, Arc::new(AuthService::new(SECRET, 0)))
    }

    fn bearer(username: &str, is_admin: bool) -> String {
        let token = sign(&json!({ "username": username, "isAdmin": is_admin }));
        format!("Bearer {token}")
    }

    async fn status(uri: &str, authorization: Option<String>) -> StatusCode {
        let mut req = Request::builder().uri(uri);
        if let Some(value) = authorization {
            req = req.header("authorization", value);
        }
        let resp = app()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        resp.status()
    }

    #[tokio::test]
    async fn logged_in_guard() {
        assert_eq!(status("/me", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status("/me", Some("Bearer bad".into())).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status("/me", Some(bearer("test", false))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn admin_guard() {
        assert_eq!(status("/admin", None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status("/admin", Some(bearer("test", false))).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status("/admin", Some(bearer("admin", true))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn self_or_admin_guard() {
        assert_eq!(
            status("/users/alice", Some(bearer("alice", false))).await,
            StatusCode::OK
        );
        assert_eq!(
            status("/users/alice", Some(bearer("bob", false))).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status("/users/alice", Some(bearer("root", true))).await,
            StatusCode::OK
        );
        assert_eq!(status("/users/alice", None).await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn rejection_has_json_error_body() {
        let resp = app()
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn guard_without_authenticate_layer_rejects() {
        let app = Router::new().route(
            "/me",
            get(ok).route_layer(middleware::from_fn(ensure_logged_in)),
        );
        let req = Request::builder()
            .uri("/me")
            .header("authorization", bearer("test", false))
            .body(Body::empty())
            .unwrap();

        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
