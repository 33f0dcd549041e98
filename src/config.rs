/*
 * Responsibility
 * - 環境変数や設定の読み込み (DATABASE_URL, SECRET_KEY など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - 署名用 secret はここで 1 回だけ読み、AuthService に渡す (グローバルには置かない)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

const DEV_SECRET_KEY: &str = "secret-dev";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,

    // HS256 signing secret shared with the token issuer
    pub secret_key: String,
    pub token_leeway_seconds: u64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("app_env", &self.app_env)
            .field("token_leeway_seconds", &self.token_leeway_seconds)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match var("PORT") {
            Some(s) => s.parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = var("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let app_env = AppEnv::parse(var("APP_ENV").as_deref());

        let secret_key = match var("SECRET_KEY") {
            Some(s) => s,
            None if app_env.is_production() => return Err(ConfigError::Missing("SECRET_KEY")),
            None => {
                tracing::warn!("SECRET_KEY not set, using the development default");
                DEV_SECRET_KEY.to_string()
            }
        };
        if secret_key.trim().is_empty() {
            return Err(ConfigError::Invalid("SECRET_KEY"));
        }

        let token_leeway_seconds = match var("TOKEN_LEEWAY_SECONDS") {
            Some(v) => v
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("TOKEN_LEEWAY_SECONDS"))?,
            None => 0,
        };

        Ok(Self {
            addr,
            database_url,
            app_env,
            secret_key,
            token_leeway_seconds,
        })
    }
}
