//! Durable key-value store for petition collections and statistics
//!
//! Values are JSON documents keyed by `(kind, name)`, kept in SQLite. There are
//! no multi-key transactions: every `put` commits on its own.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::StoreError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 1;

type Result<T> = std::result::Result<T, StoreError>;

/// Key of a stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreKey {
    pub kind: &'static str,
    pub name: &'static str,
}

impl StoreKey {
    pub const fn new(kind: &'static str, name: &'static str) -> Self {
        Self { kind, name }
    }

    fn not_found(&self) -> StoreError {
        StoreError::NotFound {
            kind: self.kind.to_string(),
            name: self.name.to_string(),
        }
    }
}

/// SQLite-backed durable store
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Default store location (~/.local/share/whpetitions/store.db on Linux)
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| StoreError::Io("Could not determine data directory".to_string()))?;
        Ok(base.join("whpetitions").join("store.db"))
    }

    /// Open or create the store at `path`
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StoreError::Io(format!("Failed to create store dir: {}", e)))?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Open a store that lives only as long as this value
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Store schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            conn.execute_batch("DROP TABLE IF EXISTS entities;")?;
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entities (
                kind TEXT NOT NULL,
                name TEXT NOT NULL,
                data TEXT NOT NULL,
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (kind, name)
            );
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Overwrite the value stored under `key`
    pub fn put<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<()> {
        let data = serde_json::to_string(value)?;
        let now = Utc::now().timestamp_millis();

        self.lock()?.execute(
            "INSERT OR REPLACE INTO entities (kind, name, data, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![key.kind, key.name, data, now],
        )?;
        log::debug!("Stored {}/{} ({} bytes)", key.kind, key.name, data.len());
        Ok(())
    }

    /// Load the value stored under `key`
    pub fn get<T: DeserializeOwned>(&self, key: StoreKey) -> Result<T> {
        let data: Option<String> = self
            .lock()?
            .query_row(
                "SELECT data FROM entities WHERE kind = ?1 AND name = ?2",
                params![key.kind, key.name],
                |row| row.get(0),
            )
            .optional()?;

        let data = data.ok_or_else(|| key.not_found())?;
        Ok(serde_json::from_str(&data)?)
    }

    /// When `key` was last written, if ever
    pub fn updated_at(&self, key: StoreKey) -> Result<Option<DateTime<Utc>>> {
        let millis: Option<i64> = self
            .lock()?
            .query_row(
                "SELECT updated_at FROM entities WHERE kind = ?1 AND name = ?2",
                params![key.kind, key.name],
                |row| row.get(0),
            )
            .optional()?;

        Ok(millis.and_then(DateTime::from_timestamp_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    const KEY: StoreKey = StoreKey::new("Thing", "one");

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Thing {
        n: i64,
        label: String,
    }

    #[test]
    fn test_put_get() {
        let store = Store::open_in_memory().unwrap();
        let thing = Thing {
            n: 3,
            label: "three".to_string(),
        };

        store.put(KEY, &thing).unwrap();

        assert_eq!(store.get::<Thing>(KEY).unwrap(), thing);
    }

    #[test]
    fn test_get_missing_is_not_found() {
        let store = Store::open_in_memory().unwrap();

        let err = store.get::<Thing>(KEY).unwrap_err();

        match err {
            StoreError::NotFound { kind, name } => {
                assert_eq!(kind, "Thing");
                assert_eq!(name, "one");
            }
            other => panic!("Expected StoreError::NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_put_overwrites_in_place() {
        let store = Store::open_in_memory().unwrap();
        store.put(KEY, &Thing { n: 1, label: "a".into() }).unwrap();
        store.put(KEY, &Thing { n: 2, label: "b".into() }).unwrap();

        assert_eq!(store.get::<Thing>(KEY).unwrap().n, 2);
    }

    #[test]
    fn test_keys_are_tuples() {
        let store = Store::open_in_memory().unwrap();
        let other_kind = StoreKey::new("Other", "one");
        let other_name = StoreKey::new("Thing", "two");

        store.put(KEY, &1_i64).unwrap();
        store.put(other_kind, &2_i64).unwrap();
        store.put(other_name, &3_i64).unwrap();

        assert_eq!(store.get::<i64>(KEY).unwrap(), 1);
        assert_eq!(store.get::<i64>(other_kind).unwrap(), 2);
        assert_eq!(store.get::<i64>(other_name).unwrap(), 3);
    }

    #[test]
    fn test_wrong_shape_is_serialization_error() {
        let store = Store::open_in_memory().unwrap();
        store.put(KEY, &"just a string").unwrap();

        let err = store.get::<Thing>(KEY).unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("store.db");

        {
            let store = Store::open_at(&path).unwrap();
            store.put(KEY, &Thing { n: 9, label: "nine".into() }).unwrap();
        }

        let store = Store::open_at(&path).unwrap();
        assert_eq!(store.get::<Thing>(KEY).unwrap().n, 9);
    }

    #[test]
    fn test_updated_at() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(store.updated_at(KEY).unwrap(), None);

        let before = Utc::now().timestamp_millis();
        store.put(KEY, &1_i64).unwrap();

        let updated = store.updated_at(KEY).unwrap().unwrap();
        assert!(updated.timestamp_millis() >= before);
    }
}
