/// Errors from set operations.
#[derive(Debug, thiserror::Error)]
pub enum CrdtError {
    /// The identifier is not in the set as of the last sync.
    #[error("index out of range: {0}")]
    IndexOutOfRange(String),

    #[error("store error: {0}")]
    Store(#[from] perma_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] perma_index::IndexError),
}

pub type CrdtResult<T> = Result<T, CrdtError>;
