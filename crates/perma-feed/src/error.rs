/// Errors from feed operations.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("index error: {0}")]
    Index(#[from] perma_index::IndexError),

    #[error("store error: {0}")]
    Store(#[from] perma_store::StoreError),

    #[error("cipher error: {0}")]
    Cipher(#[from] perma_crypto::CipherError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

pub type FeedResult<T> = Result<T, FeedError>;
