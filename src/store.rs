//! The link store: single source of truth for all links
//!
//! Every operation runs under one store-wide mutex, so the existence check
//! and the insert in [`LinkStore::create`] form a single critical section and
//! concurrent click increments are never lost. Reads hand out clones; no
//! reference into the map ever escapes the lock.
//!
//! Mutations are passed to the configured [`Persistence`] backend before the
//! lock is released. If that write fails, the change is undone and the
//! caller gets [`StoreError::Persistence`].

use chrono::Utc;
use parking_lot::Mutex;

use crate::error::{PersistenceError, StoreError};
use crate::model::Link;
use crate::persistence::{LinkMap, MemoryOnly, Persistence};

pub struct LinkStore {
    links: Mutex<LinkMap>,
    persistence: Box<dyn Persistence>,
}

impl LinkStore {
    /// A store without durable storage. All links vanish with the process.
    pub fn in_memory() -> Self {
        Self {
            links: Mutex::new(LinkMap::new()),
            persistence: Box::new(MemoryOnly),
        }
    }

    /// Opens a store backed by `persistence`, loading whatever it already holds.
    ///
    /// Fails if the backend cannot be read or holds two records with the
    /// same short code.
    pub fn open(persistence: impl Persistence) -> Result<Self, PersistenceError> {
        let mut links = LinkMap::new();
        for link in persistence.load()? {
            if links.contains_key(&link.short_code) {
                return Err(PersistenceError::Corrupt(format!(
                    "duplicate short code {:?}",
                    link.short_code
                )));
            }
            links.insert(link.short_code.clone(), link);
        }

        Ok(Self {
            links: Mutex::new(links),
            persistence: Box::new(persistence),
        })
    }

    /// Inserts a new link keyed by its short code.
    ///
    /// Returns [`StoreError::AlreadyExists`] if the code is taken; the
    /// existing record is left untouched.
    pub fn create(&self, link: Link) -> Result<(), StoreError> {
        let mut links = self.links.lock();

        if links.contains_key(&link.short_code) {
            return Err(StoreError::AlreadyExists(link.short_code));
        }

        let code = link.short_code.clone();
        links.insert(code.clone(), link);

        if let Err(e) = self.persistence.commit(&links[&code], &links) {
            links.remove(&code);
            return Err(e.into());
        }
        Ok(())
    }

    /// Returns a copy of the link stored under `short_code`.
    pub fn get(&self, short_code: &str) -> Result<Link, StoreError> {
        self.links
            .lock()
            .get(short_code)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(short_code.to_owned()))
    }

    /// Adds one click and stamps `last_accessed` with the current time.
    pub fn increment_clicks(&self, short_code: &str) -> Result<(), StoreError> {
        let mut links = self.links.lock();

        let Some(link) = links.get_mut(short_code) else {
            return Err(StoreError::NotFound(short_code.to_owned()));
        };
        let before = (link.clicks, link.last_accessed);
        link.record_click(Utc::now());

        if let Err(e) = self.persistence.commit(&links[short_code], &links) {
            if let Some(link) = links.get_mut(short_code) {
                (link.clicks, link.last_accessed) = before;
            }
            return Err(e.into());
        }
        Ok(())
    }

    /// Snapshot of every stored link, in no particular order.
    pub fn list_all(&self) -> Vec<Link> {
        self.links.lock().values().cloned().collect()
    }

    /// Number of links currently stored.
    ///
    /// # Returns
    ///
    /// The count at the moment the lock was taken; concurrent creates may
    /// change it right after.
    pub fn len(&self) -> usize {
        self.links.lock().len()
    }

    /// Returns `true` when no link has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the persistence backend in use.
    pub fn backend(&self) -> &'static str {
        self.persistence.name()
    }
}
