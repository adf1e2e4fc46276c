//! Read-through cache for rendered views
//!
//! Entries expire after their TTL and are also flushed wholesale whenever a
//! refresh writes new data to the store.

pub mod storage;

use std::fmt;
use std::time::Duration;

use crate::error::CacheError;

/// Cache TTL configuration
pub struct CacheTtl;

impl CacheTtl {
    /// Rendered pages. Refreshes flush them earlier.
    pub const VIEW: Duration = Duration::from_secs(90 * 60); // 90 min
}

/// Logical identity of a rendered view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    /// The main page, or its empty variant
    Home,
    /// The 404 page
    NotFound,
}

impl ViewKey {
    pub const ALL: [ViewKey; 2] = [ViewKey::Home, ViewKey::NotFound];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKey::Home => "home",
            ViewKey::NotFound => "not-found",
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cache of rendered views, shared between readers and refreshes
pub trait ViewCache: Send + Sync {
    /// Cached bytes for `key`, or `None` on a miss or expired entry
    fn get(&self, key: ViewKey) -> Result<Option<Vec<u8>>, CacheError>;

    /// Current flush generation. Every `flush_all` advances it.
    fn generation(&self) -> Result<i64, CacheError>;

    /// Store `data` under `key` for `ttl`, unless a flush happened after
    /// `generation` was read. Returns whether the entry was stored.
    fn put(
        &self,
        key: ViewKey,
        data: &[u8],
        ttl: Duration,
        generation: i64,
    ) -> Result<bool, CacheError>;

    /// Drop every entry and advance the generation in one transaction;
    /// returns how many entries were removed
    fn flush_all(&self) -> Result<usize, CacheError>;
}

pub use storage::CacheStorage;
