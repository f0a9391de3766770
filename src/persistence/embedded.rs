//! Embedded redb backend
//!
//! Links are kept in a single table:
//!
//! - Key: short code, e.g. `"abc123"`
//! - Value: JSON-serialized [`Link`], e.g. `'{"id":"...","short_code":"abc123",...}'`
//!
//! Each commit upserts only the changed record inside one write transaction,
//! so cost does not grow with the number of stored links.

use std::path::Path;

use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use super::{LinkMap, Persistence};
use crate::error::PersistenceError;
use crate::model::Link;

/// Table holding every link, keyed by short code.
pub const TABLE_LINKS: TableDefinition<&str, &str> = TableDefinition::new("links_v1");

pub struct EmbeddedDb {
    db: Database,
}

impl EmbeddedDb {
    /// Creates or opens the database file at `path` and makes sure the
    /// links table exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        Ok(Self {
            db: init_db(path.as_ref())?,
        })
    }

    fn read_all(&self) -> Result<Vec<(String, String)>, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_LINKS)?;

        let mut rows = Vec::new();
        for entry in table.iter()? {
            let (key, value) = entry?;
            rows.push((key.value().to_owned(), value.value().to_owned()));
        }
        Ok(rows)
    }

    fn upsert(&self, short_code: &str, record_json: &str) -> Result<(), redb::Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(TABLE_LINKS)?;
            table.insert(short_code, record_json)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

fn init_db(path: &Path) -> Result<Database, redb::Error> {
    let db = Database::create(path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_LINKS)?;
    }
    write_txn.commit()?;

    Ok(db)
}

impl Persistence for EmbeddedDb {
    fn load(&self) -> Result<Vec<Link>, PersistenceError> {
        self.read_all()?
            .into_iter()
            .map(|(key, value)| {
                let link: Link = serde_json::from_str(&value)?;
                if link.short_code != key {
                    return Err(PersistenceError::Corrupt(format!(
                        "record stored under {key:?} has short code {:?}",
                        link.short_code
                    )));
                }
                Ok(link)
            })
            .collect()
    }

    fn commit(&self, changed: &Link, _links: &LinkMap) -> Result<(), PersistenceError> {
        let record_json = serde_json::to_string(changed)?;
        Ok(self.upsert(&changed.short_code, &record_json)?)
    }

    fn name(&self) -> &'static str {
        "redb"
    }
}
