//! Petition API client

use async_trait::async_trait;

use crate::error::Result;

#[cfg(test)]
pub mod fixtures;
#[cfg(test)]
pub mod mock;
pub mod models;
pub mod petitions;

#[cfg(test)]
pub use mock::MockPetitionClient;
pub use models::{Ingestion, Petition, PetitionSet, PetitionStatus};
pub use petitions::PetitionClient;

/// Read-only access to the upstream petition listing
#[async_trait]
pub trait PetitionApi: Send + Sync {
    /// Fetch every petition with the given status, unsorted and without
    /// ingestion fields.
    async fn fetch_petitions(&self, status: PetitionStatus) -> Result<PetitionSet>;
}
