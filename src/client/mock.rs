//! Mock petition API client for testing
//!
//! Serves canned petitions per status without making network calls.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{PetitionApi, PetitionSet, PetitionStatus};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// # Example
/// ```ignore
/// let mock = MockPetitionClient::new()
///     .with_petitions(PetitionStatus::Responded, vec![PetitionBuilder::new("1").build()]);
/// ```
#[derive(Default)]
pub struct MockPetitionClient {
    petitions: Arc<Mutex<HashMap<PetitionStatus, PetitionSet>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockPetitionClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the petitions returned for `status`
    pub fn with_petitions(self, status: PetitionStatus, petitions: PetitionSet) -> Self {
        self.petitions
            .try_lock()
            .expect("mock not shared yet")
            .insert(status, petitions);
        self
    }

    /// Make the next call fail with `error`
    pub fn with_error(self, error: ApiError) -> Self {
        *self.error.try_lock().expect("mock not shared yet") = Some(error);
        self
    }

    /// Replace the petitions for `status` on an already-shared mock
    pub async fn set_petitions(&self, status: PetitionStatus, petitions: PetitionSet) {
        self.petitions.lock().await.insert(status, petitions);
    }

    /// Number of fetches made so far
    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl PetitionApi for MockPetitionClient {
    async fn fetch_petitions(&self, status: PetitionStatus) -> Result<PetitionSet> {
        *self.calls.lock().await += 1;

        if let Some(err) = self.error.lock().await.take() {
            return Err(err.into());
        }

        Ok(self
            .petitions
            .lock()
            .await
            .get(&status)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::PetitionBuilder;

    #[tokio::test]
    async fn test_mock_returns_per_status() {
        let mock = MockPetitionClient::new().with_petitions(
            PetitionStatus::Responded,
            vec![PetitionBuilder::new("r1").build()],
        );

        let responded = mock.fetch_petitions(PetitionStatus::Responded).await.unwrap();
        let pending = mock
            .fetch_petitions(PetitionStatus::PendingResponse)
            .await
            .unwrap();

        assert_eq!(responded.len(), 1);
        assert!(pending.is_empty());
        assert_eq!(mock.call_count().await, 2);
    }

    #[tokio::test]
    async fn test_mock_error_consumed_once() {
        let mock = MockPetitionClient::new().with_error(ApiError::Network("down".to_string()));

        assert!(mock.fetch_petitions(PetitionStatus::Responded).await.is_err());
        assert!(mock.fetch_petitions(PetitionStatus::Responded).await.is_ok());
    }
}
