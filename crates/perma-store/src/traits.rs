use async_trait::async_trait;
use perma_types::ContentId;

use crate::error::StoreResult;

/// Raw content-addressed object store.
///
/// Backends move bytes; they do not verify them. Integrity checking happens
/// in [`StoreClient`](crate::StoreClient), so every backend gets the same
/// check on every read.
///
/// - `put` is idempotent: the same bytes always yield the same identifier.
/// - `get` returns `StoreError::NotFound` for unknown identifiers.
/// - Service-side refusals surface as `StoreError::Remote` with the payload
///   passed through verbatim.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload bytes and return the identifier the store assigned.
    async fn put(&self, data: &[u8]) -> StoreResult<ContentId>;

    /// Download the bytes stored under `id`, unverified.
    async fn get(&self, id: &ContentId) -> StoreResult<Vec<u8>>;
}
