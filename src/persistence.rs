//! Durable storage behind the link store
//!
//! The store keeps every link in memory and hands each mutation to a
//! [`Persistence`] backend while still holding its lock. Backends:
//!
//! - [`MemoryOnly`]: nothing is written, all links are lost on restart.
//! - [`JsonFile`]: the whole link set as one JSON array, rewritten atomically.
//! - [`EmbeddedDb`]: a redb table, one record upserted per mutation.

pub mod embedded;
pub mod json_file;

use std::collections::HashMap;

use crate::error::PersistenceError;
use crate::model::Link;

pub use embedded::EmbeddedDb;
pub use json_file::JsonFile;

/// Map of short code to link, as held by the store.
pub type LinkMap = HashMap<String, Link>;

pub trait Persistence: Send + Sync + 'static {
    /// Reads every stored link. Called once when the store is opened.
    ///
    /// A backend with nothing stored yet returns an empty list.
    fn load(&self) -> Result<Vec<Link>, PersistenceError>;

    /// Makes a mutation durable.
    ///
    /// `changed` is the record that was just inserted or updated and `links`
    /// is the full map after the change. Backends pick whichever they need.
    /// Returning an error makes the store undo the change.
    fn commit(&self, changed: &Link, links: &LinkMap) -> Result<(), PersistenceError>;

    /// Short backend name for diagnostics.
    fn name(&self) -> &'static str;
}

/// Purely in-memory mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryOnly;

impl Persistence for MemoryOnly {
    fn load(&self) -> Result<Vec<Link>, PersistenceError> {
        Ok(Vec::new())
    }

    fn commit(&self, _changed: &Link, _links: &LinkMap) -> Result<(), PersistenceError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Backend whose writes can be switched to fail, for exercising error paths.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct Flaky {
    failing: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(test)]
impl Flaky {
    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing
            .store(failing, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Persistence for Flaky {
    fn load(&self) -> Result<Vec<Link>, PersistenceError> {
        Ok(Vec::new())
    }

    fn commit(&self, _changed: &Link, _links: &LinkMap) -> Result<(), PersistenceError> {
        if self.failing.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(PersistenceError::io(
                "flaky",
                std::io::Error::other("disk full"),
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "flaky"
    }
}
