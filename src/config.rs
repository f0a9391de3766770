//! Environment-driven configuration
//!
//! # Environment Variables
//!
//! - `HOST` - Interface to bind (default: `0.0.0.0`)
//! - `PORT` - Server port number (default: `8080`)
//! - `BASE_URL` - Prefix for generated short URLs (default: `http://localhost:8080`)
//! - `STORAGE_BACKEND` - `memory`, `json` or `redb` (default: `json`)
//! - `DATA_FILE` - JSON file for the `json` backend (default: `links.json`)
//! - `DATABASE_URL` - Database file for the `redb` backend (default: `links.redb`)
//! - `CODE_MAX_ATTEMPTS` - Collision retries per shorten request (default: `5`)

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{ConfigError, PersistenceError};
use crate::persistence::{EmbeddedDb, JsonFile};
use crate::service::DEFAULT_MAX_ATTEMPTS;
use crate::store::LinkStore;

/// Persistence backend selected by `STORAGE_BACKEND`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Memory,
    Json(PathBuf),
    Redb(PathBuf),
}

impl StorageBackend {
    /// Opens a [`LinkStore`] on this backend.
    pub fn open_store(&self) -> Result<LinkStore, PersistenceError> {
        match self {
            StorageBackend::Memory => Ok(LinkStore::in_memory()),
            StorageBackend::Json(path) => LinkStore::open(JsonFile::new(path)),
            StorageBackend::Redb(path) => LinkStore::open(EmbeddedDb::open(path)?),
        }
    }
}

/// Runtime settings for the server
///
/// Built once at startup by [`Config::from_env`] and then only read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Interface the listener binds to
    pub host: String,

    /// Port the listener binds to
    pub port: u16,

    /// Prefix joined with a short code to form the short URL
    pub base_url: String,

    /// Where links are persisted
    pub storage: StorageBackend,

    /// Generate-and-insert attempts per shorten request, at least one
    pub max_attempts: u32,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_owned())
        };

        let port = parse("PORT", var("PORT", "8080"))?;
        let max_attempts: u32 = parse(
            "CODE_MAX_ATTEMPTS",
            var("CODE_MAX_ATTEMPTS", &DEFAULT_MAX_ATTEMPTS.to_string()),
        )?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "CODE_MAX_ATTEMPTS",
                value: max_attempts.to_string(),
                reason: "must be at least 1".to_owned(),
            });
        }

        let backend = var("STORAGE_BACKEND", "json");
        let storage = match backend.to_ascii_lowercase().as_str() {
            "memory" => StorageBackend::Memory,
            "json" => StorageBackend::Json(var("DATA_FILE", "links.json").into()),
            "redb" => StorageBackend::Redb(var("DATABASE_URL", "links.redb").into()),
            _ => {
                return Err(ConfigError::Invalid {
                    key: "STORAGE_BACKEND",
                    value: backend,
                    reason: "expected one of memory, json, redb".to_owned(),
                })
            }
        };

        Ok(Self {
            host: var("HOST", "0.0.0.0"),
            port,
            base_url: var("BASE_URL", "http://localhost:8080"),
            storage,
            max_attempts,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}
