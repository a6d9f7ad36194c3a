//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use packcalc_core::validation::normalize_catalog;
use packcalc_core::{DEFAULT_MAX_SEARCH_LIMIT, DEFAULT_PACK_SIZES};

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP port
    pub port: u16,

    /// Interface to bind
    pub bind_addr: String,

    /// SQLite file; `None` selects the in-memory store
    pub database_path: Option<PathBuf>,

    /// Catalog installed into an empty store at startup
    pub default_packs: Vec<i64>,

    /// Largest optimizer search window accepted
    pub max_search_limit: usize,

    /// Deadline for one optimizer run; `None` disables it
    pub calculation_timeout: Option<Duration>,

    /// SQLite pool size
    pub db_max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            port: 8080,
            bind_addr: "0.0.0.0".to_string(),
            database_path: None,
            default_packs: DEFAULT_PACK_SIZES.to_vec(),
            max_search_limit: DEFAULT_MAX_SEARCH_LIMIT,
            calculation_timeout: Some(Duration::from_millis(5000)),
            db_max_connections: 5,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();

        let timeout_ms: u64 = parse_or(&lookup, "CALCULATION_TIMEOUT_MS", 5000)?;

        let config = ApiConfig {
            port: parse_or(&lookup, "PORT", defaults.port)?,

            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),

            database_path: lookup("DATABASE_PATH")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),

            default_packs: match lookup("DEFAULT_PACKS") {
                Some(list) => parse_packs(&list)?,
                None => defaults.default_packs,
            },

            max_search_limit: parse_or(&lookup, "MAX_SEARCH_LIMIT", defaults.max_search_limit)?,

            // 0 disables the deadline
            calculation_timeout: (timeout_ms > 0).then(|| Duration::from_millis(timeout_ms)),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_addr, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("BIND_ADDR".to_string()))
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// `"250,500, 1000"` → validated, normalized catalog.
fn parse_packs(list: &str) -> Result<Vec<i64>, ConfigError> {
    let invalid = || ConfigError::InvalidValue("DEFAULT_PACKS".to_string());

    let sizes = list
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<i64>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;

    normalize_catalog(&sizes).map_err(|_| invalid())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
