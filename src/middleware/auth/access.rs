//! Bearer token → AuthCtx (best effort)
//!
//! - `Authorization: Bearer <jwt>` があれば AuthService で署名 / exp を検証する
//! - 成功時は principal 入りの AuthCtx、ヘッダ無し・形式違い・検証失敗時は空の AuthCtx を
//!   extensions に入れる
//! - このレイヤではリクエストを拒否しない。拒否は guard (ensure_*) の責務

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::api::v1::extractors::AuthCtx;
use crate::services::auth::AuthService;

/// Router 全体に authenticate を掛ける。
///
/// 例：
/// ```ignore
/// let v1 = middleware::auth::access::apply(api::v1::routes(), state.auth.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<S>(router: Router<S>, auth: Arc<AuthService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(auth, authenticate))
}

async fn authenticate(
    State(auth): State<Arc<AuthService>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // set at most once per request
    if req.extensions().get::<AuthCtx>().is_none() {
        let ctx = authenticate_headers(&auth, req.headers());
        req.extensions_mut().insert(ctx);
    }

    next.run(req).await
}

/// Build the request's AuthCtx from its headers. Never fails.
pub fn authenticate_headers(auth: &AuthService, headers: &HeaderMap) -> AuthCtx {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
    else {
        return AuthCtx::anonymous();
    };

    // Verification failures are not an error here; the guards decide.
    match auth.verify(token) {
        Ok(principal) => {
            tracing::debug!(
                username = %principal.username,
                is_admin = principal.is_admin,
                issued_at = ?principal.issued_at(),
                expires_at = ?principal.expires_at(),
                "bearer token accepted"
            );
            AuthCtx::authenticated(principal)
        }
        Err(err) => {
            tracing::debug!(error = %err, "bearer token ignored");
            AuthCtx::anonymous()
        }
    }
}

/// `Bearer <token>` (scheme is case-insensitive, surrounding whitespace trimmed)
fn bearer_token(value: &str) -> Option<&str> {
    let value = value.trim();
    let (scheme, rest) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::v1::extractors::AuthCtxExtractor;
    use crate::services::auth::Principal;
    use crate::services::auth::access_jwt::test_support::{SECRET, now, sign, sign_with};
    use axum::{Json, routing::get};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn whoami(AuthCtxExtractor(ctx): AuthCtxExtractor) -> Json<Value> {
        Json(json!({
            "username": ctx.principal().map(|p| p.username.clone()),
            "isAdmin": ctx.principal().map(|p| p.is_admin),
        }))
    }

    fn app() -> Router {
        let auth = Arc::new(AuthService::new(SECRET, 0));
        apply(Router::new().route("/whoami", get(whoami)), auth)
    }

    async fn call(authorization: Option<&str>) -> (axum::http::StatusCode, Value) {
        let mut req = Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }

        let resp = app()
            .oneshot(req.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn parses_bearer_scheme() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer abc"), Some("abc"));
        assert_eq!(bearer_token("BEARER  abc  "), Some("abc"));
        assert_eq!(bearer_token("  Bearer\tabc"), Some("abc"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwdw=="), None);
        assert_eq!(bearer_token("abc"), None);
    }

    #[tokio::test]
    async fn no_header_leaves_context_empty() {
        let (status, body) = call(None).await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["username"], Value::Null);
    }

    #[tokio::test]
    async fn valid_token_sets_principal() {
        let token = sign(&json!({ "username": "test", "isAdmin": false }));

        let (status, body) = call(Some(format!("Bearer {token}").as_str())).await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["username"], "test");
        assert_eq!(body["isAdmin"], false);
    }

    #[tokio::test]
    async fn lowercase_scheme_is_accepted() {
        let token = sign(&json!({ "username": "admin", "isAdmin": true }));

        let (_, body) = call(Some(format!("  bearer {token} ").as_str())).await;

        assert_eq!(body["username"], "admin");
        assert_eq!(body["isAdmin"], true);
    }

    #[tokio::test]
    async fn invalid_token_does_not_fail_request() {
        let forged = sign_with(&json!({ "username": "test" }), "wrong");

        let (status, body) = call(Some(format!("Bearer {forged}").as_str())).await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["username"], Value::Null);
    }

    #[tokio::test]
    async fn expired_token_does_not_fail_request() {
        let expired = sign(&json!({ "username": "test", "exp": now() - 60 }));

        let (status, body) = call(Some(format!("Bearer {expired}").as_str())).await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["username"], Value::Null);
    }

    #[tokio::test]
    async fn garbage_header_does_not_fail_request() {
        let (status, body) = call(Some("Bearer not.a.jwt")).await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(body["username"], Value::Null);
    }

    // outer layer that fills the context before authenticate runs
    async fn preset(mut req: Request<Body>, next: Next) -> Response {
        req.extensions_mut().insert(AuthCtx::authenticated(Principal {
            username: "preset".into(),
            is_admin: true,
            claims: serde_json::Map::new(),
        }));
        next.run(req).await
    }

    #[tokio::test]
    async fn existing_context_is_not_replaced() {
        let token = sign(&json!({ "username": "other", "isAdmin": false }));
        let req = Request::builder()
            .uri("/whoami")
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .unwrap();

        let resp = app()
            .layer(middleware::from_fn(preset))
            .oneshot(req)
            .await
            .unwrap();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["username"], "preset");
        assert_eq!(body["isAdmin"], true);
    }

    #[test]
    fn authenticate_headers_without_header_is_anonymous() {
        let auth = AuthService::new(SECRET, 0);

        assert!(!authenticate_headers(&auth, &HeaderMap::new()).is_authenticated());
    }
}
