//! Error types surfaced by the store, its persistence backends and the
//! shortening service.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of a [`Persistence`](crate::persistence::Persistence) backend.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("link serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("embedded database error: {0}")]
    Database(#[from] redb::Error),
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

impl PersistenceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Outcome of a failed [`LinkStore`](crate::store::LinkStore) operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("short code already exists: {0}")]
    AlreadyExists(String),
    #[error("short code not found: {0}")]
    NotFound(String),
    /// The durable write failed; the in-memory change was rolled back.
    #[error("failed to persist links: {0}")]
    Persistence(#[from] PersistenceError),
}

#[derive(Debug, Error)]
pub enum ShortenError {
    #[error("url cannot be empty")]
    EmptyUrl,
    #[error("no free short code after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
