/*
 * Responsibility
 * - 環境変数や設定の読み込み (COGNITO_USER_POOL_ID, AWS_REGION, JWKS 設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 * - TrustParameters の導出 (pipeline 側は環境変数を読まない)
 */
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::services::authorizer::TrustParameters;

pub const DEFAULT_REGION: &str = "us-west-2";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration: {0}")]
    Missing(&'static str),
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub aws_region: String,
    pub user_pool_id: String,
    pub access_token_leeway_seconds: u64,

    pub jwks_cache_max_age: Duration,
    pub jwks_cooldown: Duration,
    pub jwks_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (environment, test map, ...).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port: u16 = parse_or(&get, "PORT", 3000)?;
        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = get("APP_ENV")
            .map(|v| AppEnv::parse(&v))
            .unwrap_or(AppEnv::Development);

        let user_pool_id = get("COGNITO_USER_POOL_ID")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("COGNITO_USER_POOL_ID"))?;

        let aws_region = get("AWS_REGION")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let access_token_leeway_seconds = parse_or(&get, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        let jwks_cache_max_age =
            Duration::from_secs(parse_or(&get, "JWKS_CACHE_MAX_AGE_SECONDS", 600)?);
        let jwks_cooldown = Duration::from_secs(parse_or(&get, "JWKS_COOLDOWN_SECONDS", 30)?);
        let jwks_timeout = Duration::from_millis(parse_or(&get, "JWKS_TIMEOUT_MS", 5000)?);

        Ok(Self {
            addr,
            app_env,
            aws_region,
            user_pool_id,
            access_token_leeway_seconds,
            jwks_cache_max_age,
            jwks_cooldown,
            jwks_timeout,
        })
    }

    pub fn trust_parameters(&self) -> Result<TrustParameters, ConfigError> {
        TrustParameters::for_user_pool(
            &self.aws_region,
            &self.user_pool_id,
            self.access_token_leeway_seconds,
        )
    }
}

// Absent => default; present but unparsable => Invalid.
fn parse_or<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match get(key) {
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
