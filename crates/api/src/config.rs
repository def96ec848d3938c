//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        })
    }
}

/// Connection pool settings. Without a URL the in-memory store is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
            min_connections: 0,
            acquire_timeout: Duration::from_millis(30_000),
            idle_timeout: Duration::from_millis(10_000),
        }
    }
}

/// Cache endpoint probed by the detailed health check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl RedisConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `APP_ENV`: environment name reported by health checks; `development`
///   also exposes internal error causes (default: `"development"`)
/// - `HOST` / `PORT`: bind address (default: `"0.0.0.0"`, `3000`)
/// - `API_PREFIX`: mount point of the resource routes (default: `"/api/v1"`)
/// - `ALLOWED_ORIGINS`: comma-separated CORS origins (default: `"*"`)
/// - `DATABASE_URL`, `DB_POOL_MAX`, `DB_POOL_MIN`, `DB_POOL_ACQUIRE_MS`, `DB_POOL_IDLE_MS`
/// - `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`: cache is "not configured" without a host
/// - `HEALTH_PROBE_TIMEOUT_MS`: per-probe timeout (default: `2000`)
/// - `BCRYPT_COST`: password hashing cost (default: `12`)
/// - `RUST_LOG` / `LOG_LEVEL`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `pretty` or `json` (default: `pretty`)
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub host: String,
    pub port: u16,
    pub api_prefix: String,
    pub allowed_origins: Vec<String>,
    pub database: DatabaseConfig,
    pub redis: Option<RedisConfig>,
    pub probe_timeout: Duration,
    pub bcrypt_cost: u32,
    pub log_level: String,
    pub log_format: LogFormat,
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key).and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = DatabaseConfig {
            url: non_empty("DATABASE_URL"),
            max_connections: parsed(&lookup, "DB_POOL_MAX", defaults.database.max_connections),
            min_connections: parsed(&lookup, "DB_POOL_MIN", defaults.database.min_connections),
            acquire_timeout: Duration::from_millis(parsed(&lookup, "DB_POOL_ACQUIRE_MS", 30_000)),
            idle_timeout: Duration::from_millis(parsed(&lookup, "DB_POOL_IDLE_MS", 10_000)),
        };

        let redis = non_empty("REDIS_HOST").map(|host| RedisConfig {
            host,
            port: parsed(&lookup, "REDIS_PORT", 6379),
            password: non_empty("REDIS_PASSWORD"),
        });

        let allowed_origins = non_empty("ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.allowed_origins);

        Self {
            environment: non_empty("APP_ENV").unwrap_or(defaults.environment),
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT", defaults.port),
            api_prefix: non_empty("API_PREFIX").unwrap_or(defaults.api_prefix),
            allowed_origins,
            database,
            redis,
            probe_timeout: Duration::from_millis(parsed(&lookup, "HEALTH_PROBE_TIMEOUT_MS", 2_000)),
            bcrypt_cost: parsed(&lookup, "BCRYPT_COST", defaults.bcrypt_cost),
            log_level: non_empty("RUST_LOG")
                .or_else(|| non_empty("LOG_LEVEL"))
                .unwrap_or(defaults.log_level),
            log_format: parsed(&lookup, "LOG_FORMAT", LogFormat::default()),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Internal error causes are only put in response bodies in development.
    pub fn exposes_error_details(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_prefix: "/api/v1".to_string(),
            allowed_origins: vec!["*".to_string()],
            database: DatabaseConfig::default(),
            redis: None,
            probe_timeout: Duration::from_millis(2_000),
            bcrypt_cost: 12,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}
