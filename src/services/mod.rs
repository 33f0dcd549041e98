/*
 * Responsibility
 * - handler / middleware から使うドメイン外のサービス (認証など)
 */
pub mod auth;
