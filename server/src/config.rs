//! Process configuration read from environment variables.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default `0.0.0.0`)
//! - `PORT`: bind port (default `8080`)
//! - `STORAGE_MODE`: `postgres` (default) | `memory`
//! - `DATABASE_URL`: full connection URL, takes precedence over `DB_*`
//! - `DB_SERVER`, `DB_PORT`, `DB_USER`, `DB_PASSWORD`, `DB_NAME`: connection
//!   parts (`localhost`, `5432`, `postgres`, required, `postgres`)
//! - `DB_MAX_CONNECTIONS`: pool size (default `5`)

use std::env;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid STORAGE_MODE: {0} (expected `postgres` or `memory`)")]
    InvalidStorageMode(String),

    #[error("invalid {name}: {value}")]
    InvalidNumber { name: &'static str, value: String },

    #[error("DB_PASSWORD or DATABASE_URL must be set when STORAGE_MODE=postgres")]
    MissingDatabaseCredentials,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageMode {
    #[default]
    Postgres,
    Memory,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "memory" | "in_memory" | "inmemory" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidStorageMode(value.to_string())),
        }
    }
}

/// Connection settings for the PostgreSQL adapter.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

// The URL may hold a password.
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage_mode: StorageMode,
    /// Present iff `storage_mode` is `Postgres`.
    pub database: Option<DatabaseConfig>,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    /// Returns `ConfigError` on unparsable values or missing credentials.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty and whitespace-only values count as unset.
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_number(&var, "PORT", 8080u16)?;
        let storage_mode = match var("STORAGE_MODE") {
            Some(value) => value.parse()?,
            None => StorageMode::default(),
        };

        let database = match storage_mode {
            StorageMode::Memory => None,
            StorageMode::Postgres => {
                let max_connections = parse_number(&var, "DB_MAX_CONNECTIONS", 5u32)?;
                let url = match var("DATABASE_URL") {
                    Some(url) => url,
                    None => {
                        let password =
                            var("DB_PASSWORD").ok_or(ConfigError::MissingDatabaseCredentials)?;
                        let server = var("DB_SERVER").unwrap_or_else(|| "localhost".to_string());
                        let port = parse_number(&var, "DB_PORT", 5432u16)?;
                        let user = var("DB_USER").unwrap_or_else(|| "postgres".to_string());
                        let name = var("DB_NAME").unwrap_or_else(|| "postgres".to_string());
                        format!("postgres://{user}:{password}@{server}:{port}/{name}")
                    }
                };
                Some(DatabaseConfig {
                    url,
                    max_connections,
                })
            }
        };

        Ok(Self {
            host,
            port,
            storage_mode,
            database,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T, F>(var: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { name, value }),
        None => Ok(default),
    }
}
