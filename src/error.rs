//! Error types for whpetitions

use std::fmt;

use thiserror::Error;

/// Result type alias for whpetitions operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Upstream petition API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode petitions document: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to petitions API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Durable store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("No stored value for {kind}/{name}")]
    NotFound { kind: String, name: String },

    #[error("Store database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to (de)serialize stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store I/O error: {0}")]
    Io(String),

    #[error("Store lock poisoned")]
    Poisoned,
}

/// View cache errors. Callers log these and carry on.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache lock poisoned")]
    Poisoned,
}

/// Aggregation errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("No petitions with usable timing data to average")]
    EmptyCollection,

    #[error("Petition {id} has an unrepresentable deadline: {deadline}")]
    DeadlineOutOfRange { id: String, deadline: i64 },

    #[error("Average duration out of range")]
    DurationOutOfRange,
}

/// Errors raised by a renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to render {view}: {reason}")]
    Failed { view: String, reason: String },
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Stage at which a refresh stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStage {
    Fetching,
    Aggregating,
    Persisting,
    Invalidating,
}

impl fmt::Display for RefreshStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefreshStage::Fetching => "fetching",
            RefreshStage::Aggregating => "aggregating",
            RefreshStage::Persisting => "persisting",
            RefreshStage::Invalidating => "invalidating",
        };
        f.write_str(name)
    }
}

/// A refresh that failed, with the stage it failed in
#[derive(Debug, Error)]
#[error("{partition} refresh failed while {stage}: {source}")]
pub struct RefreshError {
    pub partition: String,
    pub stage: RefreshStage,
    #[source]
    pub source: Box<Error>,
}

impl Error {
    /// Whether this error came from the durable store
    pub fn is_storage(&self) -> bool {
        match self {
            Error::Store(_) => true,
            Error::Refresh(r) => r.source.is_storage(),
            _ => false,
        }
    }
}
