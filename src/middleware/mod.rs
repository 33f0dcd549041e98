/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: authenticate (AuthCtx 付与) と route guard
 * - http: request-id / access log / body limit / timeout
 */
pub mod auth;
pub mod http;
