//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderValue;
use thiserror::Error;
use ticklist_core::defaults::SESSION_COOKIE_NAME;
use ticklist_db::PoolConfig;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:5173,http://localhost:3000";
const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 100;
const DEFAULT_RATE_LIMIT_PERIOD_SECS: u64 = 60;
const DEFAULT_REQUEST_BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Configuration errors, reported at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Rate limit settings. A zero request count or period is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub requests: u32,
    pub period: Duration,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<HeaderValue>,
    pub session_cookie_name: String,
    /// Built from the `DB_*` variables.
    pub pool: PoolConfig,
    /// `None` when rate limiting is disabled.
    pub rate_limit: Option<RateLimitConfig>,
    pub request_body_limit_bytes: usize,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let rate_limit_enabled = parse_or(&lookup, "RATE_LIMIT_ENABLED", false, parse_bool)?;
        let rate_limit = if rate_limit_enabled {
            let requests = parse_or(
                &lookup,
                "RATE_LIMIT_REQUESTS",
                DEFAULT_RATE_LIMIT_REQUESTS,
                |v| v.parse::<u32>().map_err(|e| e.to_string()),
            )?;
            let period_secs = parse_or(
                &lookup,
                "RATE_LIMIT_PERIOD_SECS",
                DEFAULT_RATE_LIMIT_PERIOD_SECS,
                |v| v.parse::<u64>().map_err(|e| e.to_string()),
            )?;
            if requests == 0 {
                return Err(invalid("RATE_LIMIT_REQUESTS", "0", "must be greater than zero"));
            }
            if period_secs == 0 {
                return Err(invalid("RATE_LIMIT_PERIOD_SECS", "0", "must be greater than zero"));
            }
            Some(RateLimitConfig {
                requests,
                period: Duration::from_secs(period_secs),
            })
        } else {
            None
        };

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&lookup, "PORT", DEFAULT_PORT, |v| {
                v.parse::<u16>().map_err(|e| e.to_string())
            })?,
            allowed_origins: parse_allowed_origins(
                &lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGINS.to_string()),
            ),
            session_cookie_name: lookup("SESSION_COOKIE_NAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| SESSION_COOKIE_NAME.to_string()),
            pool: pool_config(&lookup)?,
            rate_limit,
            request_body_limit_bytes: parse_or(
                &lookup,
                "REQUEST_BODY_LIMIT_BYTES",
                DEFAULT_REQUEST_BODY_LIMIT_BYTES,
                |v| v.parse::<usize>().map_err(|e| e.to_string()),
            )?,
        })
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse::<SocketAddr>()
            .map_err(|e| invalid("HOST", &addr, &e.to_string()))
    }
}

/// Pool settings. A zero idle timeout or max lifetime disables that limit.
fn pool_config<F>(lookup: &F) -> Result<PoolConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = PoolConfig::default();
    let count = |v: &str| v.parse::<u32>().map_err(|e| e.to_string());
    let secs = |v: &str| v.parse::<u64>().map_err(|e| e.to_string());
    let optional_secs = |v: &str| secs(v).map(|n| (n > 0).then(|| Duration::from_secs(n)));

    let max_connections = parse_or(
        lookup,
        "DB_MAX_CONNECTIONS",
        defaults.max_connections,
        count,
    )?;
    if max_connections == 0 {
        return Err(invalid("DB_MAX_CONNECTIONS", "0", "must be greater than zero"));
    }
    let min_connections = parse_or(
        lookup,
        "DB_MIN_CONNECTIONS",
        defaults.min_connections,
        count,
    )?;
    if min_connections > max_connections {
        return Err(invalid(
            "DB_MIN_CONNECTIONS",
            &min_connections.to_string(),
            "must not exceed DB_MAX_CONNECTIONS",
        ));
    }

    Ok(PoolConfig {
        max_connections,
        min_connections,
        acquire_timeout: Duration::from_secs(parse_or(
            lookup,
            "DB_ACQUIRE_TIMEOUT_SECS",
            defaults.acquire_timeout.as_secs(),
            secs,
        )?),
        idle_timeout: parse_or(
            lookup,
            "DB_IDLE_TIMEOUT_SECS",
            defaults.idle_timeout,
            optional_secs,
        )?,
        max_lifetime: parse_or(
            lookup,
            "DB_MAX_LIFETIME_SECS",
            defaults.max_lifetime,
            optional_secs,
        )?,
    })
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_or<F, T, P>(lookup: &F, name: &'static str, default: T, parse: P) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Result<T, String>,
{
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => {
            parse(value.trim()).map_err(|reason| invalid(name, &value, &reason))
        }
        _ => Ok(default),
    }
}

fn parse_bool(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err("expected true or false".to_string()),
    }
}

/// Parse a comma-separated origin list. Invalid entries are logged and skipped.
///
/// ```text
/// ALLOWED_ORIGINS=https://todo.example.com,http://localhost:5173
/// ```
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}
