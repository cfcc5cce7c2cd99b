/*
 * Responsibility
 * - Load settings from the environment (.env first, then process env)
 * - Validate them; any error here aborts startup
 * - The shared secret is required and must be non-empty
 */
use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderValue;
use thiserror::Error;

use crate::services::auth::SharedSecret;

pub const JWT_SECRET_KEY: &str = "SUPABASE_JWT_SECRET";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<&str>) -> Self {
        match raw.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
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

    pub jwt_secret: SharedSecret,
    // Optional claim pinning; None means the claim is not checked.
    pub auth_issuer: Option<String>,
    pub auth_audience: Option<String>,
    pub access_token_leeway_seconds: u64,

    // Empty means any origin.
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout_seconds: u64,
    pub request_body_limit_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let jwt_secret = lookup(JWT_SECRET_KEY)
            .and_then(|s| SharedSecret::new(s).ok())
            .ok_or(ConfigError::Missing(JWT_SECRET_KEY))?;

        let auth_issuer = non_empty(lookup("AUTH_ISSUER"));
        let auth_audience = non_empty(lookup("AUTH_AUDIENCE"));
        let access_token_leeway_seconds = parse_or(&lookup, "ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();
        if !cors_allowed_origins.iter().all(|o| is_valid_origin(o)) {
            return Err(ConfigError::Invalid("CORS_ALLOWED_ORIGINS"));
        }

        let request_timeout_seconds = parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?;
        if request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid("REQUEST_TIMEOUT_SECONDS"));
        }
        let request_body_limit_bytes = parse_or(&lookup, "REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        Ok(Self {
            addr,
            app_env,
            jwt_secret,
            auth_issuer,
            auth_audience,
            access_token_leeway_seconds,
            cors_allowed_origins,
            request_timeout_seconds,
            request_body_limit_bytes,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// "*" or an http(s) origin that can be sent back as a header value.
fn is_valid_origin(origin: &str) -> bool {
    if origin == "*" {
        return true;
    }
    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"));
    matches!(rest, Some(host) if !host.is_empty() && !host.contains('/'))
        && HeaderValue::from_str(origin).is_ok()
}

// Unset falls back to the default; set-but-unparsable is an error.
fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
