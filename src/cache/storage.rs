//! SQLite-based view cache storage

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use super::{ViewCache, ViewKey};
use crate::error::CacheError;

/// Schema version - increment to trigger nuke-and-rebuild
const SCHEMA_VERSION: i32 = 2;

type Result<T> = std::result::Result<T, CacheError>;

/// SQLite-backed view cache
pub struct CacheStorage {
    conn: Mutex<Connection>,
}

impl CacheStorage {
    /// Default cache location (~/.cache/whpetitions/views.db on Linux)
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::cache_dir()
            .ok_or_else(|| CacheError::Io("Could not determine cache directory".to_string()))?;
        Ok(base.join("whpetitions").join("views.db"))
    }

    /// Open or create a cache database at `path`
    pub fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CacheError::Io(format!("Failed to create cache dir: {}", e)))?;
        }
        Self::init(Connection::open(path)?)
    }

    /// Open a process-local cache
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Check schema version - nuke if mismatched
        let version: i32 = conn
            .pragma_query_value(None, "user_version", |r| r.get(0))
            .unwrap_or(0);

        if version != 0 && version != SCHEMA_VERSION {
            log::info!(
                "Cache schema version mismatch ({} != {}), rebuilding",
                version,
                SCHEMA_VERSION
            );
            conn.execute_batch("DROP TABLE IF EXISTS views; DROP TABLE IF EXISTS cache_meta;")?;
        }

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS views (
                cache_key TEXT PRIMARY KEY NOT NULL,
                data BLOB NOT NULL,
                created_at INTEGER NOT NULL,
                expires_at INTEGER NOT NULL,
                size_bytes INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS cache_meta (
                id INTEGER PRIMARY KEY CHECK (id = 0),
                generation INTEGER NOT NULL
            );
            INSERT OR IGNORE INTO cache_meta (id, generation) VALUES (0, 0);
            "#,
        )?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Get cache statistics
    pub fn stats(&self) -> Result<CacheStats> {
        let now = Utc::now().timestamp_millis();
        let conn = self.lock()?;

        let total_entries: i64 = conn.query_row("SELECT COUNT(*) FROM views", [], |r| r.get(0))?;

        let valid_entries: i64 = conn.query_row(
            "SELECT COUNT(*) FROM views WHERE expires_at > ?1",
            [now],
            |r| r.get(0),
        )?;

        let total_size: i64 = conn.query_row(
            "SELECT COALESCE(SUM(size_bytes), 0) FROM views",
            [],
            |r| r.get(0),
        )?;

        Ok(CacheStats {
            total_entries: total_entries as usize,
            valid_entries: valid_entries as usize,
            expired_entries: (total_entries - valid_entries) as usize,
            total_size_bytes: total_size as usize,
        })
    }
}

impl ViewCache for CacheStorage {
    fn get(&self, key: ViewKey) -> Result<Option<Vec<u8>>> {
        let now = Utc::now().timestamp_millis();

        Ok(self
            .lock()?
            .query_row(
                "SELECT data FROM views WHERE cache_key = ?1 AND expires_at > ?2",
                params![key.as_str(), now],
                |row| row.get(0),
            )
            .optional()?)
    }

    fn generation(&self) -> Result<i64> {
        Ok(self.lock()?.query_row(
            "SELECT generation FROM cache_meta WHERE id = 0",
            [],
            |row| row.get(0),
        )?)
    }

    fn put(&self, key: ViewKey, data: &[u8], ttl: Duration, generation: i64) -> Result<bool> {
        let now = Utc::now().timestamp_millis();
        let expires = now.saturating_add(i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX));

        // Single statement: the generation check and the write are atomic
        let stored = self.lock()?.execute(
            "INSERT OR REPLACE INTO views (cache_key, data, created_at, expires_at, size_bytes)
             SELECT ?1, ?2, ?3, ?4, ?5 FROM cache_meta WHERE id = 0 AND generation = ?6",
            params![key.as_str(), data, now, expires, data.len(), generation],
        )?;
        Ok(stored > 0)
    }

    fn flush_all(&self) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM views", [])?;
        tx.execute(
            "UPDATE cache_meta SET generation = generation + 1 WHERE id = 0",
            [],
        )?;
        tx.commit()?;
        log::debug!("Flushed {} cached views", removed);
        Ok(removed)
    }
}

/// Statistics about cache state
#[derive(Debug)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
    pub total_size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_storage() -> CacheStorage {
        CacheStorage::open_in_memory().unwrap()
    }

    #[test]
    fn test_put_get() {
        let storage = test_storage();
        let data = b"<html>home</html>";

        storage
            .put(ViewKey::Home, data, Duration::from_secs(60), 0)
            .unwrap();

        assert_eq!(storage.get(ViewKey::Home).unwrap(), Some(data.to_vec()));
        assert_eq!(storage.get(ViewKey::NotFound).unwrap(), None);
    }

    #[test]
    fn test_put_get_large_view() {
        let storage = test_storage();
        let data = vec![b'x'; 512 * 1024];

        storage
            .put(ViewKey::Home, &data, Duration::from_secs(60), 0)
            .unwrap();

        assert_eq!(storage.get(ViewKey::Home).unwrap(), Some(data));
    }

    #[test]
    fn test_expiration() {
        let storage = test_storage();

        // Store with 0 TTL (immediately expired)
        storage
            .put(ViewKey::Home, b"data", Duration::from_secs(0), 0)
            .unwrap();

        assert_eq!(storage.get(ViewKey::Home).unwrap(), None);
    }

    #[test]
    fn test_flush_all() {
        let storage = test_storage();

        for key in ViewKey::ALL {
            storage
                .put(key, key.as_str().as_bytes(), Duration::from_secs(60), 0)
                .unwrap();
        }

        assert_eq!(storage.flush_all().unwrap(), 2);

        for key in ViewKey::ALL {
            assert!(storage.get(key).unwrap().is_none());
        }
        assert_eq!(storage.flush_all().unwrap(), 0);
    }

    #[test]
    fn test_put_replaces() {
        let storage = test_storage();
        storage
            .put(ViewKey::Home, b"old", Duration::from_secs(60), 0)
            .unwrap();
        storage
            .put(ViewKey::Home, b"new", Duration::from_secs(60), 0)
            .unwrap();

        assert_eq!(storage.get(ViewKey::Home).unwrap(), Some(b"new".to_vec()));
    }

    #[test]
    fn test_stats() {
        let storage = test_storage();

        storage
            .put(ViewKey::Home, b"data1", Duration::from_secs(60), 0)
            .unwrap();
        storage
            .put(ViewKey::NotFound, b"data2", Duration::from_secs(0), 0)
            .unwrap();

        let stats = storage.stats().unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.expired_entries, 1);
        assert_eq!(stats.total_size_bytes, 10);
    }

    #[test]
    fn test_file_backed_cache_shared_between_handles() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("views.db");

        let writer = CacheStorage::open_at(&path).unwrap();
        let reader = CacheStorage::open_at(&path).unwrap();

        writer
            .put(ViewKey::Home, b"shared", Duration::from_secs(60), 0)
            .unwrap();
        assert_eq!(reader.get(ViewKey::Home).unwrap(), Some(b"shared".to_vec()));

        reader.flush_all().unwrap();
        assert_eq!(writer.get(ViewKey::Home).unwrap(), None);
        assert_eq!(writer.generation().unwrap(), 1);
    }

    #[test]
    fn test_put_after_flush_is_skipped() {
        let storage = test_storage();
        let generation = storage.generation().unwrap();

        storage.flush_all().unwrap();
        let stored = storage
            .put(ViewKey::Home, b"rendered before flush", Duration::from_secs(60), generation)
            .unwrap();

        assert!(!stored);
        assert_eq!(storage.get(ViewKey::Home).unwrap(), None);

        let current = storage.generation().unwrap();
        assert_eq!(current, generation + 1);
        assert!(storage
            .put(ViewKey::Home, b"fresh", Duration::from_secs(60), current)
            .unwrap());
        assert_eq!(storage.get(ViewKey::Home).unwrap(), Some(b"fresh".to_vec()));
    }

    #[test]
    fn test_generation_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("views.db");

        CacheStorage::open_at(&path).unwrap().flush_all().unwrap();
        let reopened = CacheStorage::open_at(&path).unwrap();

        assert_eq!(reopened.generation().unwrap(), 1);
    }
}
