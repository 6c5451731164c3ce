//! Error types for the index crate.

use perma_types::TypeError;

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The index service answered with an explicit error payload.
    #[error("remote error: {0}")]
    Remote(String),

    /// The request never produced a usable response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A listed entry does not have the `version.content.proof` shape.
    #[error("malformed index entry: {0}")]
    MalformedEntry(#[from] TypeError),

    /// The proof verifier refused an entry.
    #[error("proof rejected for {entry}: {reason}")]
    ProofRejected { entry: String, reason: String },

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] perma_store::StoreError),

    /// The signer capability could not produce a signature.
    #[error("signer error: {0}")]
    Signer(#[from] perma_crypto::SignerError),

    /// Serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
