//! Single-file JSON backend
//!
//! Layout on disk is one JSON array of [`Link`] records. A missing file is an
//! empty store; an unparsable one is an error.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use super::{LinkMap, Persistence};
use crate::error::PersistenceError;
use crate::model::Link;

/// Stores all links as a pretty-printed JSON array in a single file.
///
/// Every commit rewrites the whole file: the array is written to a sibling
/// `<file>.tmp`, flushed to disk, then renamed over the target. Readers
/// therefore see either the old or the new file, never a torn one.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    /// Creates a backend writing to `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Target file, e.g. `"links.json"`. Nothing is touched until
    ///   the first commit; the parent directory must already exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file links are written to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "links.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn write_atomic(&self, bytes: &[u8]) -> Result<(), PersistenceError> {
        let temp = self.temp_path();

        let written = write_synced(&temp, bytes)
            .map_err(|e| PersistenceError::io(&temp, e))
            .and_then(|()| {
                fs::rename(&temp, &self.path).map_err(|e| PersistenceError::io(&self.path, e))
            });
        if let Err(e) = written {
            fs::remove_file(&temp).ok();
            return Err(e);
        }

        sync_parent_dir(&self.path)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Makes the rename itself durable.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<(), PersistenceError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    File::open(dir)
        .and_then(|d| d.sync_all())
        .map_err(|e| PersistenceError::io(dir, e))
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<(), PersistenceError> {
    Ok(())
}

impl Persistence for JsonFile {
    fn load(&self) -> Result<Vec<Link>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            // First start: no file means no links yet.
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(PersistenceError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn commit(&self, _changed: &Link, links: &LinkMap) -> Result<(), PersistenceError> {
        let mut records: Vec<&Link> = links.values().collect();
        // Stable file contents make diffs and backups readable.
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });

        let json = serde_json::to_vec_pretty(&records)?;
        self.write_atomic(&json)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}
