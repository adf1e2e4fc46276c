//! HTTP implementation of the petition API

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client as HttpClient;

use super::models::PetitionsDocument;
use super::{PetitionApi, PetitionSet, PetitionStatus};
use crate::error::{ApiError, Result};

/// Default upstream base URL
pub const API_BASE_URL: &str = "https://api.whitehouse.gov/v1";

/// Deadline for one fetch, rate-limiter wait included
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Page size requested from the upstream
pub const PAGE_LIMIT: u32 = 500;

/// At most one upstream call per second, with a little burst for back-to-back
/// pending/responded triggers.
const RATE_LIMIT_PER_SECOND: NonZeroU32 = NonZeroU32::new(1).unwrap();
const RATE_LIMIT_BURST: NonZeroU32 = NonZeroU32::new(2).unwrap();

/// Petition API client
pub struct PetitionClient {
    http: HttpClient,
    base_url: String,
    limit: u32,
    timeout: Duration,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl PetitionClient {
    /// Create a client against `base_url` with a hard per-request deadline
    pub fn new(base_url: impl Into<String>, timeout: Duration, limit: u32) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(RATE_LIMIT_PER_SECOND).allow_burst(RATE_LIMIT_BURST);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
            timeout,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    fn listing_url(&self) -> String {
        format!("{}/petitions.json", self.base_url)
    }
}

#[async_trait]
impl PetitionApi for PetitionClient {
    async fn fetch_petitions(&self, status: PetitionStatus) -> Result<PetitionSet> {
        let started = Instant::now();
        tokio::time::timeout(self.timeout, self.rate_limiter.until_ready())
            .await
            .map_err(|_| ApiError::Network("Request timed out waiting for rate limit".to_string()))?;
        let remaining = self.timeout.saturating_sub(started.elapsed());

        let url = self.listing_url();
        log::debug!("GET {} status={:?}", url, status.as_query());

        let response = self
            .http
            .get(&url)
            .query(&[
                ("status", status.as_query().to_string()),
                ("limit", self.limit.to_string()),
            ])
            .timeout(remaining)
            .send()
            .await
            .map_err(ApiError::from)?;

        let code = response.status();
        if !code.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| code.to_string());
            return Err(ApiError::Status {
                status: code.as_u16(),
                body,
            }
            .into());
        }

        let body = response.bytes().await.map_err(ApiError::from)?;
        let document: PetitionsDocument =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        let mut petitions = document.results;
        for petition in &mut petitions {
            petition.ingestion = None;
        }
        log::debug!("Fetched {} petitions ({})", petitions.len(), status.as_query());
        Ok(petitions)
    }
}
