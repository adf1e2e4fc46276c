//! Petition API data models
//!
//! The upstream document is untrusted. Timing fields are required and strictly
//! typed; descriptive text fields default to empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Petition lifecycle status as understood by the upstream `status` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PetitionStatus {
    PendingResponse,
    Responded,
}

impl PetitionStatus {
    /// Value of the `status` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            PetitionStatus::PendingResponse => "pending response",
            PetitionStatus::Responded => "responded",
        }
    }
}

/// Top-level petitions document: `{"Results": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PetitionsDocument {
    #[serde(rename = "Results", alias = "results")]
    pub results: Vec<Petition>,
}

/// Ordered collection of petitions
pub type PetitionSet = Vec<Petition>;

/// A single petition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Petition {
    #[serde(rename = "Id", alias = "id")]
    pub id: String,

    #[serde(rename = "Title", alias = "title", default)]
    pub title: String,

    #[serde(rename = "Url", alias = "url", default)]
    pub url: String,

    #[serde(rename = "Status", alias = "status", default)]
    pub status: String,

    #[serde(rename = "Body", alias = "body", default)]
    pub body: String,

    #[serde(rename = "SignatureThreshold", alias = "signatureThreshold", default)]
    pub signature_threshold: Option<i64>,

    #[serde(rename = "SignatureCount", alias = "signatureCount", default)]
    pub signature_count: Option<i64>,

    #[serde(rename = "SignaturesNeeded", alias = "signaturesNeeded", default)]
    pub signatures_needed: Option<i64>,

    /// Deadline, epoch seconds
    #[serde(rename = "Deadline", alias = "deadline")]
    pub deadline: i64,

    /// Creation time, epoch seconds
    #[serde(rename = "Created", alias = "created")]
    pub created: i64,

    #[serde(
        rename = "Response",
        alias = "response",
        default,
        deserialize_with = "deserialize_response"
    )]
    pub response: Option<WhResponse>,

    /// Filled in at ingestion time only
    #[serde(rename = "Ingestion", default)]
    pub ingestion: Option<Ingestion>,
}

/// Official response linked to a petition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhResponse {
    #[serde(rename = "Id", alias = "id", default)]
    pub id: String,

    #[serde(rename = "Url", alias = "url", default)]
    pub url: String,

    /// Epoch seconds encoded as a string; may be missing or garbage
    #[serde(rename = "AssociationTime", alias = "associationTime", default)]
    pub association_time: Option<String>,
}

impl WhResponse {
    /// Association time as epoch seconds, if present and an integer
    pub fn association_epoch(&self) -> Option<i64> {
        self.association_time
            .as_deref()
            .and_then(|t| t.trim().parse::<i64>().ok())
    }
}

/// Values derived from the raw fields when a collection is ingested
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingestion {
    pub deadline_time: DateTime<Utc>,
    pub updated_time: DateTime<Utc>,
    pub year_ago: bool,
}

/// The upstream encodes "no response" as `null`, `[]` or by omitting the field.
fn deserialize_response<'de, D>(deserializer: D) -> Result<Option<WhResponse>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ResponseField {
        Info(WhResponse),
        Empty([(); 0]),
    }

    Ok(match Option::<ResponseField>::deserialize(deserializer)? {
        Some(ResponseField::Info(info)) => Some(info),
        Some(ResponseField::Empty(_)) | None => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> serde_json::Result<PetitionsDocument> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_minimal_petition_decodes() {
        let doc = decode(r#"{"Results":[{"Id":"1","Deadline":1000,"Created":900}]}"#).unwrap();
        assert_eq!(doc.results.len(), 1);
        let p = &doc.results[0];
        assert_eq!(p.id, "1");
        assert_eq!(p.deadline, 1000);
        assert_eq!(p.created, 900);
        assert!(p.title.is_empty());
        assert!(p.response.is_none());
        assert!(p.ingestion.is_none());
    }

    #[test]
    fn test_upstream_camel_case_fields() {
        let doc = decode(
            r#"{"results":[{
                "id":"abc","title":"Do a thing","url":"https://example.org/p/abc",
                "status":"responded","body":"Please","signatureThreshold":100000,
                "signatureCount":123456,"signaturesNeeded":0,
                "deadline":1400000000,"created":1397000000,
                "response":{"id":"r1","url":"https://example.org/r/1","associationTime":"1401000000"}
            }]}"#,
        )
        .unwrap();
        let p = &doc.results[0];
        assert_eq!(p.signature_count, Some(123456));
        let resp = p.response.as_ref().unwrap();
        assert_eq!(resp.association_epoch(), Some(1_401_000_000));
    }

    #[test]
    fn test_missing_deadline_is_error() {
        let err = decode(r#"{"Results":[{"Id":"1","Created":900}]}"#).unwrap_err();
        assert!(err.to_string().contains("Deadline"));
    }

    #[test]
    fn test_wrong_typed_deadline_is_error() {
        assert!(decode(r#"{"Results":[{"Id":"1","Deadline":"soon","Created":900}]}"#).is_err());
    }

    #[test]
    fn test_wrong_typed_counter_is_error() {
        assert!(
            decode(r#"{"Results":[{"Id":"1","Deadline":1,"Created":1,"SignatureCount":"many"}]}"#)
                .is_err()
        );
    }

    #[test]
    fn test_missing_results_is_error() {
        assert!(decode(r#"{"metadata":{}}"#).is_err());
    }

    #[test]
    fn test_empty_response_encodings() {
        for response in ["null", "[]"] {
            let json = format!(
                r#"{{"Results":[{{"Id":"1","Deadline":1,"Created":1,"Response":{}}}]}}"#,
                response
            );
            let doc = decode(&json).unwrap();
            assert!(doc.results[0].response.is_none(), "response = {}", response);
        }
    }

    #[test]
    fn test_association_epoch_unparseable() {
        let resp = WhResponse {
            id: "r".to_string(),
            url: String::new(),
            association_time: Some("not-a-number".to_string()),
        };
        assert_eq!(resp.association_epoch(), None);

        let resp = WhResponse {
            association_time: None,
            ..resp
        };
        assert_eq!(resp.association_epoch(), None);
    }

    #[test]
    fn test_status_query_values() {
        assert_eq!(PetitionStatus::PendingResponse.as_query(), "pending response");
        assert_eq!(PetitionStatus::Responded.as_query(), "responded");
    }
}
