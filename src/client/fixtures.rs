//! Test fixtures and builders for petition models
//!
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use super::models::{Petition, WhResponse};

/// Builder for creating test Petition instances.
///
/// # Example
/// ```ignore
/// let petition = PetitionBuilder::new("p-1")
///     .deadline(1_400_000_000)
///     .association_time("1401000000")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct PetitionBuilder {
    petition: Petition,
}

impl PetitionBuilder {
    /// Create a new builder with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            petition: Petition {
                title: format!("Petition {}", &id),
                url: format!("https://petitions.example.org/petition/{}", &id),
                id,
                status: "pending response".to_string(),
                body: String::new(),
                signature_threshold: Some(100_000),
                signature_count: Some(100_000),
                signatures_needed: Some(0),
                deadline: 1_000,
                created: 900,
                response: None,
                ingestion: None,
            },
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.petition.title = title.into();
        self
    }

    pub fn deadline(mut self, deadline: i64) -> Self {
        self.petition.deadline = deadline;
        self
    }

    pub fn created(mut self, created: i64) -> Self {
        self.petition.created = created;
        self
    }

    pub fn signature_count(mut self, count: i64) -> Self {
        self.petition.signature_count = Some(count);
        self
    }

    /// Attach a response with the given (raw, string-encoded) association time.
    pub fn association_time(mut self, time: impl Into<String>) -> Self {
        self.petition.status = "responded".to_string();
        self.petition.response = Some(WhResponse {
            id: format!("response-{}", self.petition.id),
            url: format!("https://petitions.example.org/response/{}", self.petition.id),
            association_time: Some(time.into()),
        });
        self
    }

    /// Attach a response without an association time.
    pub fn response_without_time(mut self) -> Self {
        self.petition.status = "responded".to_string();
        self.petition.response = Some(WhResponse {
            id: format!("response-{}", self.petition.id),
            url: String::new(),
            association_time: None,
        });
        self
    }

    pub fn build(self) -> Petition {
        self.petition
    }
}
