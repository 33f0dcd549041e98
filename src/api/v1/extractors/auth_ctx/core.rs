use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::AuthCtx;

/// Handler / guard middleware で AuthCtx を受け取るための extractor
/// authenticate middleware が通っていない場合は未認証の AuthCtx を返す
/// (401 にするかどうかは guard 側が決める)
pub struct AuthCtxExtractor(pub AuthCtx);

impl<S> FromRequestParts<S> for AuthCtxExtractor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<AuthCtx>()
            .cloned()
            .unwrap_or_default();

        Ok(AuthCtxExtractor(ctx))
    }
}
