use perma_types::{ContentId, TypeError};

/// Errors from content store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The fetched bytes do not hash to the requested identifier.
    #[error("integrity mismatch: requested {requested}, fetched data hashes to {computed}")]
    IntegrityMismatch {
        requested: ContentId,
        computed: ContentId,
    },

    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ContentId),

    /// The store service answered with an explicit error payload.
    #[error("remote error: {0}")]
    Remote(String),

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An identifier could not be parsed.
    #[error("invalid content id: {0}")]
    InvalidId(#[from] TypeError),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
