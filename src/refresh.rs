//! Refresh pipelines
//!
//! One pipeline per partition: fetch, aggregate, persist, then flush every
//! cached view so readers never see a render older than the store.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::cache::ViewCache;
use crate::client::{PetitionApi, PetitionSet, PetitionStatus};
use crate::error::{Error, RefreshError, RefreshStage, Result};
use crate::stats::{Stats, aggregate_pending, aggregate_responded};
use crate::store::{Store, StoreKey};

/// Sorted pending petitions, as last ingested
pub const PENDING_COLLECTION: StoreKey = StoreKey::new("PetitionSet", "pending");
/// Statistics for petitions awaiting a response
pub const PENDING_STATS: StoreKey = StoreKey::new("Stats", "pending");
/// Statistics for petitions that received a response
pub const RESPONDED_STATS: StoreKey = StoreKey::new("Stats", "responded");

/// Independent data track with its own statistics and pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Pending,
    Responded,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Pending, Partition::Responded];

    pub fn name(&self) -> &'static str {
        match self {
            Partition::Pending => "pending",
            Partition::Responded => "responded",
        }
    }

    /// Upstream status filter for this partition
    pub fn status(&self) -> PetitionStatus {
        match self {
            Partition::Pending => PetitionStatus::PendingResponse,
            Partition::Responded => PetitionStatus::Responded,
        }
    }

    pub fn stats_key(&self) -> StoreKey {
        match self {
            Partition::Pending => PENDING_STATS,
            Partition::Responded => RESPONDED_STATS,
        }
    }

    /// Only the pending partition keeps its full collection
    pub fn collection_key(&self) -> Option<StoreKey> {
        match self {
            Partition::Pending => Some(PENDING_COLLECTION),
            Partition::Responded => None,
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of a successful refresh
#[derive(Debug, Clone)]
pub struct RefreshReport {
    pub partition: Partition,
    pub stats: Stats,
    pub views_flushed: usize,
}

/// Fetch → aggregate → persist → invalidate for one partition
pub struct RefreshPipeline {
    partition: Partition,
    client: Arc<dyn PetitionApi>,
    store: Arc<Store>,
    cache: Arc<dyn ViewCache>,
    // Serialises runs of this partition within the process
    running: Mutex<()>,
}

impl RefreshPipeline {
    pub fn new(
        partition: Partition,
        client: Arc<dyn PetitionApi>,
        store: Arc<Store>,
        cache: Arc<dyn ViewCache>,
    ) -> Self {
        Self {
            partition,
            client,
            store,
            cache,
            running: Mutex::new(()),
        }
    }

    /// Run one refresh against the current time
    pub async fn run(&self) -> Result<RefreshReport> {
        self.run_at(Utc::now()).await
    }

    /// Run one refresh with `now` as the ingestion instant
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RefreshReport> {
        let _running = self.running.lock().await;
        log::info!("Refreshing {} petitions", self.partition);

        log::debug!("{}: {}", self.partition, RefreshStage::Fetching);
        let petitions = self
            .client
            .fetch_petitions(self.partition.status())
            .await
            .map_err(|e| self.failed(RefreshStage::Fetching, e))?;

        log::debug!("{}: {}", self.partition, RefreshStage::Aggregating);
        let (collection, stats) = self
            .aggregate(petitions, now)
            .map_err(|e| self.failed(RefreshStage::Aggregating, e))?;

        log::debug!("{}: {}", self.partition, RefreshStage::Persisting);
        self.persist(collection.as_ref(), &stats)
            .map_err(|e| self.failed(RefreshStage::Persisting, e))?;

        log::debug!("{}: {}", self.partition, RefreshStage::Invalidating);
        let views_flushed = self
            .cache
            .flush_all()
            .map_err(|e| self.failed(RefreshStage::Invalidating, e.into()))?;

        log::info!(
            "Refreshed {} petitions: {} records, {} cached views flushed",
            self.partition,
            stats.count,
            views_flushed
        );
        Ok(RefreshReport {
            partition: self.partition,
            stats,
            views_flushed,
        })
    }

    fn aggregate(
        &self,
        petitions: PetitionSet,
        now: DateTime<Utc>,
    ) -> Result<(Option<PetitionSet>, Stats)> {
        Ok(match self.partition {
            Partition::Pending => {
                let (sorted, stats) = aggregate_pending(petitions, now)?;
                (Some(sorted), stats)
            }
            Partition::Responded => (None, aggregate_responded(&petitions)?),
        })
    }

    fn persist(&self, collection: Option<&PetitionSet>, stats: &Stats) -> Result<()> {
        if let (Some(key), Some(collection)) = (self.partition.collection_key(), collection) {
            self.store.put(key, collection)?;
        }
        self.store.put(self.partition.stats_key(), stats)?;
        Ok(())
    }

    fn failed(&self, stage: RefreshStage, source: Error) -> Error {
        log::warn!("{} refresh failed while {}: {}", self.partition, stage, source);
        RefreshError {
            partition: self.partition.name().to_string(),
            stage,
            source: Box::new(source),
        }
        .into()
    }
}

/// Both pipelines, sharing one store and one cache
pub struct Refreshers {
    pub pending: RefreshPipeline,
    pub responded: RefreshPipeline,
}

impl Refreshers {
    pub fn new(client: Arc<dyn PetitionApi>, store: Arc<Store>, cache: Arc<dyn ViewCache>) -> Self {
        Self {
            pending: RefreshPipeline::new(
                Partition::Pending,
                client.clone(),
                store.clone(),
                cache.clone(),
            ),
            responded: RefreshPipeline::new(Partition::Responded, client, store, cache),
        }
    }

    pub fn get(&self, partition: Partition) -> &RefreshPipeline {
        match partition {
            Partition::Pending => &self.pending,
            Partition::Responded => &self.responded,
        }
    }
}
