use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

/// Error kinds surfaced by the space API client.
///
/// Every failure from the remote store propagates to the caller unmodified;
/// there is no retry or silent recovery at this layer.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or insufficient permission for the requested operation
    /// (HTTP 401 and 403 both map here).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The remote store rejected the payload as malformed: missing required
    /// fields, duplicate identifiers, or a cardinality constraint such as
    /// the single-text-instruction rule.
    #[error("validation error: {0}")]
    Validation(String),

    /// The remote store rejected the submission outright, e.g. an
    /// identifier-keyed list that was not sorted.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Any other non-success HTTP status.
    #[error("unexpected status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The serialized config document (or a response body) failed to parse.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
