//! Command execution context
//!
//! Loads configuration once, applies command-line overrides, and builds the
//! store, cache, client and renderer that commands share by reference.

use std::sync::Arc;

use crate::cache::{CacheStorage, ViewCache};
use crate::cli::{Cli, OutputFormat};
use crate::client::PetitionClient;
use crate::config::Config;
use crate::error::Result;
use crate::refresh::Refreshers;
use crate::render::HtmlRenderer;
use crate::site::Site;
use crate::store::Store;

/// Everything a command needs, built once at startup
pub struct AppContext {
    pub config: Config,
    pub store: Arc<Store>,
    pub cache: Arc<CacheStorage>,
    pub format: OutputFormat,
}

impl AppContext {
    /// Load config and open the store and view cache.
    ///
    /// Precedence: CLI flag > environment variable > config file > default.
    pub fn new(cli: &Cli) -> Result<Self> {
        let mut config = Config::load_at(cli.config.as_deref())?;

        if let Some(ref base) = cli.api_base {
            config.api_base_url = base.clone();
        }
        if let Some(ref path) = cli.store_path {
            config.store_path = Some(path.clone());
        }
        if let Some(ref path) = cli.cache_path {
            config.cache_path = Some(path.clone());
        }
        config.validate()?;

        let store_path = config.resolved_store_path()?;
        log::debug!("Opening store at {}", store_path.display());
        let store = Arc::new(Store::open_at(&store_path)?);

        let cache_path = config.resolved_cache_path()?;
        log::debug!("Opening view cache at {}", cache_path.display());
        let cache = CacheStorage::open_at(&cache_path)?;

        Ok(Self {
            config,
            store,
            cache: Arc::new(cache),
            format: cli.format,
        })
    }

    /// Both refresh pipelines against the configured upstream
    pub fn refreshers(&self) -> Result<Refreshers> {
        let client = PetitionClient::new(
            self.config.api_base_url.clone(),
            self.config.fetch_timeout(),
            self.config.page_limit,
        )?;
        let cache: Arc<dyn ViewCache> = self.cache.clone();
        Ok(Refreshers::new(Arc::new(client), self.store.clone(), cache))
    }

    /// Read path with the built-in HTML renderer
    pub fn site(&self) -> Site {
        Site::new(
            self.store.clone(),
            self.cache.clone(),
            Arc::new(HtmlRenderer::default()),
        )
    }
}
