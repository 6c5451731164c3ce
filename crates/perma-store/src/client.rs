use std::sync::Arc;

use perma_crypto::ContentHasher;
use perma_types::ContentId;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// Verifying client over any [`ContentStore`] backend.
///
/// Every read recomputes the identifier of the returned bytes; data that
/// does not hash to the requested identifier never reaches the caller.
#[derive(Clone)]
pub struct StoreClient {
    backend: Arc<dyn ContentStore>,
}

impl StoreClient {
    pub fn new(backend: Arc<dyn ContentStore>) -> Self {
        Self { backend }
    }

    /// Upload bytes; returns the identifier assigned by the store.
    pub async fn store(&self, data: &[u8]) -> StoreResult<ContentId> {
        let id = self.backend.put(data).await?;
        debug!(cid = %id, bytes = data.len(), "stored object");
        Ok(id)
    }

    /// Fetch and verify the bytes stored under `id`.
    pub async fn fetch(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let data = self.backend.get(id).await?;
        let computed = ContentHasher::hash(&data);
        if computed != *id {
            warn!(requested = %id, computed = %computed, "fetched object failed integrity check");
            return Err(StoreError::IntegrityMismatch {
                requested: *id,
                computed,
            });
        }
        debug!(cid = %id, bytes = data.len(), "fetched object");
        Ok(data)
    }

    /// Parse a base-58 identifier, then [`fetch`](Self::fetch) it.
    pub async fn fetch_str(&self, id: &str) -> StoreResult<Vec<u8>> {
        let id = ContentId::parse(id)?;
        self.fetch(&id).await
    }

    pub fn backend(&self) -> &Arc<dyn ContentStore> {
        &self.backend
    }
}

impl std::fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryContentStore;

    fn setup() -> (Arc<InMemoryContentStore>, StoreClient) {
        let backend = Arc::new(InMemoryContentStore::new());
        let client = StoreClient::new(backend.clone());
        (backend, client)
    }

    #[tokio::test]
    async fn store_then_fetch_returns_same_bytes() {
        let (_, client) = setup();
        let id = client.store(b"TEST").await.unwrap();
        assert_eq!(client.fetch(&id).await.unwrap(), b"TEST");
    }

    #[tokio::test]
    async fn empty_payload_round_trip() {
        let (_, client) = setup();
        let id = client.store(b"").await.unwrap();
        assert_eq!(id.to_base58(), "QmbFMke1KXqnYyBBWxB74N4c5SBnJMVAiMNRcGu6x1AwQH");
        assert!(client.fetch(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn tampered_bytes_are_rejected() {
        let (backend, client) = setup();
        let id = client.store(b"original").await.unwrap();
        backend.tamper(&id, b"forged".to_vec());

        match client.fetch(&id).await {
            Err(StoreError::IntegrityMismatch { requested, computed }) => {
                assert_eq!(requested, id);
                assert_eq!(computed, ContentHasher::hash(b"forged"));
            }
            other => panic!("expected integrity mismatch, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn fetch_str_validates_identifier() {
        let (_, client) = setup();
        let id = client.store(b"hello").await.unwrap();
        assert_eq!(client.fetch_str(&id.to_base58()).await.unwrap(), b"hello");
        assert!(matches!(
            client.fetch_str("definitely not a cid").await,
            Err(StoreError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn unknown_identifier_not_found() {
        let (_, client) = setup();
        let id = ContentHasher::hash(b"missing");
        assert!(matches!(client.fetch(&id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn clones_share_backend() {
        let (backend, client) = setup();
        let other = client.clone();
        other.store(b"shared").await.unwrap();
        assert_eq!(backend.len(), 1);
    }
}
