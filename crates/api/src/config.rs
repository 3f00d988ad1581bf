use std::env;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Where collection rows live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// The hosted table REST API (`BACKEND_URL` + `BACKEND_API_KEY`).
    Rest,
    /// Direct PostgreSQL access (`DATABASE_URL`).
    Postgres,
    /// Process-local tables, lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(StoreBackend::Rest),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreBackend::Rest => "rest",
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        })
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
    pub store_backend: StoreBackend,
    /// Base URL of the hosted backend (tables, storage, auth).
    pub backend_url: Option<String>,
    pub backend_api_key: Option<String>,
    /// PostgreSQL connection URL, for the `postgres` backend.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Bucket that uploaded images go to.
    pub storage_bucket: String,
    /// Session token signing secret.
    pub jwt_secret: String,
    /// Mark session cookies `Secure`. Defaults to on unless bound to loopback.
    pub secure_cookies: bool,
    /// Per-request toast channel capacity.
    pub event_bus_capacity: usize,
    /// Largest accepted request body, uploads included.
    pub max_upload_bytes: usize,
    /// Local admin account, used when no hosted auth service is configured.
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            log_level: "info".to_string(),
            store_backend: StoreBackend::Memory,
            backend_url: None,
            backend_api_key: None,
            database_url: None,
            db_max_connections: 20,
            db_min_connections: 5,
            storage_bucket: "site-images".to_string(),
            jwt_secret: "dev-secret-change-me-in-production".to_string(),
            secure_cookies: false,
            event_bus_capacity: 64,
            max_upload_bytes: 10 * 1024 * 1024,
            admin_email: None,
            admin_password: None,
        }
    }
}

fn var(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn is_loopback(host: &str) -> bool {
    match host.parse::<IpAddr>() {
        Ok(ip) => ip.is_loopback(),
        Err(_) => host.eq_ignore_ascii_case("localhost"),
    }
}

fn parsed<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match var(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let config = Self {
            secure_cookies: parsed("COOKIE_SECURE", !is_loopback(&host))?,
            host,
            port: parsed("PORT", defaults.port)?,
            log_level: var("LOG_LEVEL").unwrap_or(defaults.log_level),
            store_backend: parsed("STORE_BACKEND", StoreBackend::Rest)?,
            backend_url: var("BACKEND_URL"),
            backend_api_key: var("BACKEND_API_KEY"),
            database_url: var("DATABASE_URL"),
            db_max_connections: parsed("DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            db_min_connections: parsed("DB_MIN_CONNECTIONS", defaults.db_min_connections)?,
            storage_bucket: var("STORAGE_BUCKET").unwrap_or(defaults.storage_bucket),
            jwt_secret: var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            event_bus_capacity: parsed("EVENT_BUS_CAPACITY", defaults.event_bus_capacity)?,
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?,
            admin_email: var("ADMIN_EMAIL"),
            admin_password: var("ADMIN_PASSWORD"),
        };
        config.check()?;
        Ok(config)
    }

    fn check(&self) -> Result<(), ConfigError> {
        match self.store_backend {
            StoreBackend::Rest => {
                self.backend_url.as_ref().ok_or(ConfigError::Missing("BACKEND_URL"))?;
                self.backend_api_key
                    .as_ref()
                    .ok_or(ConfigError::Missing("BACKEND_API_KEY"))?;
            }
            StoreBackend::Postgres => {
                self.database_url.as_ref().ok_or(ConfigError::Missing("DATABASE_URL"))?;
            }
            StoreBackend::Memory => {}
        }
        Ok(())
    }

    /// Hosted backend URL and key, when both are configured.
    pub fn remote(&self) -> Option<(&str, &str)> {
        Some((self.backend_url.as_deref()?, self.backend_api_key.as_deref()?))
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
