//! Authorization checks over a request's [`AuthCtx`].
//!
//! These never mutate the context; they only decide whether the request may
//! continue. The axum wrappers live in `middleware::auth::guard`.

use thiserror::Error;

use crate::api::v1::extractors::AuthCtx;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthorized")]
    Unauthorized,
}

/// Any authenticated principal.
pub fn require_logged_in(ctx: &AuthCtx) -> Result<(), AuthError> {
    if ctx.is_authenticated() {
        Ok(())
    } else {
        Err(AuthError::Unauthorized)
    }
}

/// Authenticated principal with `isAdmin == true`.
pub fn require_admin(ctx: &AuthCtx) -> Result<(), AuthError> {
    match ctx.principal() {
        Some(p) if p.is_admin => Ok(()),
        _ => Err(AuthError::Unauthorized),
    }
}

/// Admin, or the principal whose username matches the route's `username`.
pub fn require_self_or_admin(ctx: &AuthCtx, route_username: &str) -> Result<(), AuthError> {
    match ctx.principal() {
        Some(p) if p.is_admin || p.username == route_username => Ok(()),
        _ => Err(AuthError::Unauthorized),
    }
}
