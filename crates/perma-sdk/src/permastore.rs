use std::sync::Arc;

use perma_crdt::{GrowOnlySet, TwoPhaseSet};
use perma_crypto::{LocalSigner, PublicKey, Signer, SignerCapability};
use perma_feed::Feed;
use perma_index::{HttpIndexService, InMemoryIndex, IndexClient, InsertAck};
use perma_store::{HttpContentStore, InMemoryContentStore, ServiceConfig, StoreClient};
use perma_types::{ContentId, IndexEntry};
use tracing::info;

use crate::error::SdkResult;

/// High-level Permastore API.
///
/// Owns one store client and one index client and hands out sets and feeds
/// that share them.
#[derive(Clone, Debug)]
pub struct Permastore {
    store: StoreClient,
    index: Arc<IndexClient>,
}

impl Permastore {
    /// Connect to the HTTP services described by `config`.
    pub fn connect(config: ServiceConfig) -> SdkResult<Self> {
        config.validate()?;
        info!(api = %config.api_url, mirror = %config.mirror_url, "connecting to permastore");
        let store = StoreClient::new(Arc::new(HttpContentStore::new(config.clone())?));
        let service = Arc::new(HttpIndexService::new(config)?);
        Ok(Self::from_parts(store.clone(), IndexClient::new(store, service)))
    }

    /// Fully local instance backed by in-memory store and index.
    pub fn in_memory() -> Self {
        let store = StoreClient::new(Arc::new(InMemoryContentStore::new()));
        let service = Arc::new(InMemoryIndex::new(store.clone()));
        Self::from_parts(store.clone(), IndexClient::new(store, service))
    }

    /// Assemble from custom clients.
    pub fn from_parts(store: StoreClient, index: IndexClient) -> Self {
        Self {
            store,
            index: Arc::new(index),
        }
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    pub fn index(&self) -> &Arc<IndexClient> {
        &self.index
    }

    // ---- Content operations ----

    pub async fn put(&self, data: &[u8]) -> SdkResult<ContentId> {
        Ok(self.store.store(data).await?)
    }

    pub async fn get(&self, id: &str) -> SdkResult<Vec<u8>> {
        Ok(self.store.fetch_str(id).await?)
    }

    // ---- Index operations ----

    pub async fn insert(&self, data: &[u8], signer: &dyn Signer) -> SdkResult<InsertAck> {
        Ok(self.index.insert(data, signer).await?)
    }

    pub async fn list(&self, owner: &PublicKey) -> SdkResult<Vec<IndexEntry>> {
        Ok(self.index.list(owner).await?)
    }

    // ---- Sets and feeds ----

    pub fn grow_only_set(
        &self,
        owner: PublicKey,
        signer: impl Into<SignerCapability>,
    ) -> GrowOnlySet {
        GrowOnlySet::new(self.index.clone(), owner, signer)
    }

    /// A grow-only set owned by a local key.
    pub fn local_set(&self, signer: &LocalSigner) -> GrowOnlySet {
        self.grow_only_set(signer.public_key(), signer.clone())
    }

    /// A two-phase set whose halves are owned by two local keys.
    pub fn local_two_phase_set(&self, added: &LocalSigner, removed: &LocalSigner) -> TwoPhaseSet {
        TwoPhaseSet::new(self.local_set(added), self.local_set(removed))
    }

    pub fn feed(&self) -> Feed {
        Feed::new(self.index.clone())
    }
}
