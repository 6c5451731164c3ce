use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("configuration error: {0}")]
    Config(#[from] perma_store::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] perma_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] perma_index::IndexError),

    #[error("set error: {0}")]
    Crdt(#[from] perma_crdt::CrdtError),

    #[error("feed error: {0}")]
    Feed(#[from] perma_feed::FeedError),
}

pub type SdkResult<T> = Result<T, SdkError>;
