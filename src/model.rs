//! Data models for the link shortener
//!
//! This module defines the stored `Link` record and the request/response
//! shapes used by the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single shortening mapping owned by the [`LinkStore`](crate::store::LinkStore)
///
/// Once created, only `clicks` and `last_accessed` ever change.
///
/// Serialized layout (also the on-disk layout of the JSON backend):
///
/// ```json
/// {
///   "id": "5f0c6c2e-8a0e-4d57-9a37-5a4c2a1a9d10",
///   "original_url": "https://example.com",
///   "short_code": "Ab3xY9",
///   "clicks": 3,
///   "created_at": "2026-01-17T13:40:00Z",
///   "last_accessed": "2026-01-18T09:12:44Z"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Unique identifier assigned at creation
    pub id: String,

    /// The destination the short code redirects to
    pub original_url: String,

    /// Fixed-length key the link is stored under
    pub short_code: String,

    /// Number of successful redirects through this link
    #[serde(default)]
    pub clicks: u64,

    /// Timestamp when this link was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the most recent redirect, absent until the first click
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl Link {
    /// Builds a fresh record with a random id, zero clicks and `created_at = now`.
    pub fn new(original_url: impl Into<String>, short_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            original_url: original_url.into(),
            short_code: short_code.into(),
            clicks: 0,
            created_at: Utc::now(),
            last_accessed: None,
        }
    }

    /// Records one click at `now`.
    ///
    /// `last_accessed` is clamped to `created_at` so a clock stepping
    /// backwards can never produce `last_accessed < created_at`.
    pub(crate) fn record_click(&mut self, now: DateTime<Utc>) {
        self.clicks = self.clicks.saturating_add(1);
        self.last_accessed = Some(now.max(self.created_at));
    }
}

/// Request payload for creating a new short URL
///
/// # Example
/// ```json
/// { "url": "https://example.com/very/long/url" }
/// ```
#[derive(Deserialize, Serialize, Debug)]
pub struct ShortenRequest {
    /// The original URL to be shortened
    pub url: String,
}

/// Response returned after successfully creating a short URL
///
/// # Example
/// ```json
/// {
///   "short_code": "Ab3xY9",
///   "short_url": "http://localhost:8080/Ab3xY9",
///   "long_url": "https://example.com/very/long/url"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ShortenResponse {
    /// The generated short code
    pub short_code: String,

    /// Base URL joined with the short code
    pub short_url: String,

    /// Echo of the URL that was shortened
    pub long_url: String,
}
