/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - db: PgPool, auth: AuthService (署名検証用の鍵は起動時に 1 回だけ作る)
 * - Clone 前提で持つ (内部は Arc/Clone cheap)
 */
use std::sync::Arc;

use crate::services::auth::AuthService;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: sqlx::PgPool,
    pub auth: Arc<AuthService>,
}

impl AppState {
    pub fn new(db: sqlx::PgPool, auth: Arc<AuthService>) -> Self {
        Self { db, auth }
    }
}
