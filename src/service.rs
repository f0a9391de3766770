//! Shortening workflow on top of the store and the code generator
//!
//! The generator does not guarantee unique codes, so `shorten` retries with a
//! fresh code whenever the store reports a collision, up to a fixed number of
//! attempts.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{ShortenError, StoreError};
use crate::generator::CodeGenerator;
use crate::model::{Link, ShortenResponse};
use crate::store::LinkStore;

/// Default bound on generate-and-insert attempts per request.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

#[derive(Clone)]
pub struct Shortener {
    store: Arc<LinkStore>,
    generator: Arc<dyn CodeGenerator>,
    base_url: String,
    max_attempts: u32,
}

impl Shortener {
    /// Creates a shortener over a shared store and generator
    ///
    /// # Arguments
    ///
    /// * `store` - The link store every request goes through
    /// * `generator` - Source of candidate short codes
    /// * `base_url` - Prefix for short URLs, e.g. `"http://localhost:8080"`
    ///
    /// The collision retry bound starts at [`DEFAULT_MAX_ATTEMPTS`].
    pub fn new(
        store: Arc<LinkStore>,
        generator: Arc<dyn CodeGenerator>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            generator,
            base_url: base_url.into(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the collision retry bound. Values below one are raised to one.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn store(&self) -> &LinkStore {
        &self.store
    }

    /// Stores `url` under a freshly generated code.
    pub fn shorten(&self, url: &str) -> Result<ShortenResponse, ShortenError> {
        if url.is_empty() {
            return Err(ShortenError::EmptyUrl);
        }

        for attempt in 1..=self.max_attempts {
            let code = self.generator.generate();
            match self.store.create(Link::new(url, code.clone())) {
                Ok(()) => {
                    debug!(short_code = %code, attempt, "link created");
                    return Ok(ShortenResponse {
                        short_url: self.short_url(&code),
                        short_code: code,
                        long_url: url.to_owned(),
                    });
                }
                Err(StoreError::AlreadyExists(_)) => {
                    warn!(short_code = %code, attempt, "short code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ShortenError::Exhausted {
            attempts: self.max_attempts,
        })
    }

    /// Looks up `code` and counts one click on it.
    ///
    /// Returns the link as it was before the click. A failed click write is
    /// reported through the log only; the lookup itself still succeeds.
    pub fn resolve(&self, code: &str) -> Result<Link, StoreError> {
        let link = self.store.get(code)?;

        match self.store.increment_clicks(code) {
            Ok(()) => {}
            Err(StoreError::Persistence(e)) => {
                warn!(short_code = %code, error = %e, "failed to record click");
            }
            Err(e) => return Err(e),
        }

        Ok(link)
    }

    /// Returns the stored record for `code` without counting a click
    ///
    /// # Returns
    ///
    /// * `Ok(Link)` - A copy of the record
    /// * `Err(StoreError::NotFound)` - The code was never created
    pub fn stats(&self, code: &str) -> Result<Link, StoreError> {
        self.store.get(code)
    }

    /// Every stored link, in no particular order.
    pub fn list(&self) -> Vec<Link> {
        self.store.list_all()
    }

    /// Joins the base URL and `code` with a single `/`.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), code)
    }
}
