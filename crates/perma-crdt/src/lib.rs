//! Replicated sets over the Permastore index.
//!
//! - [`GrowOnlySet`] -- the deduplicated content of one key's index
//! - [`TwoPhaseSet`] -- an added set minus a removed set
//!
//! Both keep a local view that is refreshed only by an explicit `sync()`.
//! Writes go to the remote index immediately and become visible locally on
//! the next sync.

pub mod error;
pub mod grow_only;
pub mod two_phase;

pub use error::{CrdtError, CrdtResult};
pub use grow_only::GrowOnlySet;
pub use two_phase::TwoPhaseSet;

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use async_trait::async_trait;
    use perma_crypto::{LocalSigner, PublicKey};
    use perma_index::{
        InMemoryIndex, IndexClient, IndexError, IndexResult, IndexService, InsertAck,
        InsertRequest,
    };
    use perma_store::{InMemoryContentStore, StoreClient};

    use crate::GrowOnlySet;

    /// Lists whatever raw entries it was built with; refuses inserts.
    pub struct FixedList(pub Vec<String>);

    #[async_trait]
    impl IndexService for FixedList {
        async fn list(&self, _pubkey: &PublicKey) -> IndexResult<Vec<String>> {
            Ok(self.0.clone())
        }

        async fn insert(&self, _request: &InsertRequest) -> IndexResult<InsertAck> {
            Err(IndexError::Remote("read-only".into()))
        }
    }

    /// Fails every call the way an unreachable index would.
    pub struct Unreachable;

    #[async_trait]
    impl IndexService for Unreachable {
        async fn list(&self, _pubkey: &PublicKey) -> IndexResult<Vec<String>> {
            Err(IndexError::Remote("index unavailable".into()))
        }

        async fn insert(&self, _request: &InsertRequest) -> IndexResult<InsertAck> {
            Err(IndexError::Remote("index unavailable".into()))
        }
    }

    pub fn backend() -> (Arc<InMemoryContentStore>, Arc<IndexClient>) {
        let backend = Arc::new(InMemoryContentStore::new());
        let store = StoreClient::new(backend.clone());
        let index = Arc::new(InMemoryIndex::new(store.clone()));
        (backend, Arc::new(IndexClient::new(store, index)))
    }

    /// A set with a fresh key of its own.
    pub fn signer_set(index: &Arc<IndexClient>) -> GrowOnlySet {
        let signer = LocalSigner::generate();
        GrowOnlySet::new(index.clone(), signer.public_key(), signer)
    }
}
