//! Read path: cached views, rendered from the store on a miss

use std::sync::Arc;

use crate::cache::{CacheTtl, ViewCache, ViewKey};
use crate::client::PetitionSet;
use crate::error::Result;
use crate::refresh::{PENDING_COLLECTION, PENDING_STATS, RESPONDED_STATS};
use crate::render::{RenderData, Renderer, View};
use crate::stats::{RenderStats, Stats};
use crate::store::Store;

/// Serves rendered views through the cache
pub struct Site {
    store: Arc<Store>,
    cache: Arc<dyn ViewCache>,
    renderer: Arc<dyn Renderer>,
}

impl Site {
    pub fn new(store: Arc<Store>, cache: Arc<dyn ViewCache>, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            store,
            cache,
            renderer,
        }
    }

    /// Bytes for `key`, from the cache when possible.
    ///
    /// Cache failures are logged and treated as misses. Store failures are
    /// returned; nothing is rendered from partial data. A render is only
    /// cached if no flush happened since before the store was read.
    pub fn serve(&self, key: ViewKey) -> Result<Vec<u8>> {
        let generation = match self.cache.generation() {
            Ok(generation) => Some(generation),
            Err(e) => {
                log::warn!("Cache generation read failed: {}", e);
                None
            }
        };

        match self.cache.get(key) {
            Ok(Some(bytes)) => {
                log::debug!("Cache hit: {}", key);
                return Ok(bytes);
            }
            Ok(None) => log::debug!("Cache miss: {}", key),
            Err(e) => log::warn!("Cache read failed for {}: {}", key, e),
        }

        let bytes = self.render(key)?;

        if let Some(generation) = generation {
            match self.cache.put(key, &bytes, CacheTtl::VIEW, generation) {
                Ok(true) => {}
                Ok(false) => log::debug!("Cache flushed while rendering {}, not storing", key),
                Err(e) => log::error!("Error setting cached {}: {}", key, e),
            }
        }
        Ok(bytes)
    }

    fn render(&self, key: ViewKey) -> Result<Vec<u8>> {
        let petitions: PetitionSet = self.store.get(PENDING_COLLECTION)?;
        let responded: Stats = self.store.get(RESPONDED_STATS)?;
        let pending: Stats = self.store.get(PENDING_STATS)?;

        let view = match key {
            ViewKey::NotFound => View::NotFound,
            ViewKey::Home if petitions.is_empty() => View::Empty,
            ViewKey::Home => View::Main,
        };

        let data = RenderData {
            stats: RenderStats::new(&pending, &responded),
            petitions: &petitions,
        };
        Ok(self.renderer.render(view, &data)?)
    }
}
