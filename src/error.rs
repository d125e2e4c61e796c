//! Error types for model declaration, search and the service transport

use thiserror::Error;

/// Errors raised while declaring models, searching or pushing documents
#[derive(Debug, Error)]
pub enum TankerError {
    /// The model type was never declared in the registry
    #[error("Tanker is not configured for {0}, declare it with a tankit block first")]
    NotConfigured(String),

    /// A declaration was registered without a declarative block
    #[error("Please provide a block when declaring {0}")]
    MissingBlock(String),

    /// No index name was given and none could be derived
    #[error("Please provide a name for the index of {0}")]
    MissingIndexName(String),

    /// The requested model types live in different indexes
    #[error("You can't search across multiple indexes in one call ({})", .0.join(", "))]
    MultipleIndexes(Vec<String>),

    /// A search was requested without any model type
    #[error("A search needs at least one model type")]
    NoModels,

    /// A raw match carried neither a docid nor __type/__id tags
    #[error("Malformed search match: {0}")]
    MalformedMatch(String),

    /// An index never reported itself as running
    #[error("Index {index} was not ready after {seconds} seconds")]
    ReadyTimeout { index: String, seconds: u64 },

    /// The search service call failed
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The record store failed to load records
    #[error("Record store error: {0}")]
    Store(#[source] anyhow::Error),

    /// Option serialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by the search service transport
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Connection or protocol failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status
    #[error("Search service returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded
    #[error("Failed to decode service response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured API URL is unusable
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// The configured request timeout is not a positive number of seconds
    #[error("Invalid request timeout: {0}")]
    InvalidTimeout(f64),
}

/// Crate result alias
pub type Result<T> = std::result::Result<T, TankerError>;
