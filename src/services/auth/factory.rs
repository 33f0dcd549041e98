/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::services::auth::AuthService;

pub fn build_auth_service(config: &Config) -> Arc<AuthService> {
    Arc::new(AuthService::new(
        &config.secret_key,
        config.token_leeway_seconds,
    ))
}
