use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use perma_crypto::{recover_public_key, PublicKey};
use perma_store::StoreClient;
use perma_types::IndexEntry;
use tracing::debug;

use crate::auth::{InsertAck, InsertRequest};
use crate::error::{IndexError, IndexResult};
use crate::traits::IndexService;

/// Version tag written into entries by the in-memory index.
pub const ENTRY_VERSION: &str = "v2";

/// In-memory emulation of the index service.
///
/// Authenticates inserts by recovering the signer's key from the request
/// signature, keeps the signed request as the entry's proof object in the
/// content store, and appends `v2.<cid>.<proof>` to the signer's list.
pub struct InMemoryIndex {
    store: StoreClient,
    entries: RwLock<HashMap<PublicKey, Vec<String>>>,
    allowed: RwLock<Option<HashSet<PublicKey>>>,
}

impl InMemoryIndex {
    /// Create an empty index writing proofs to `store`.
    pub fn new(store: StoreClient) -> Self {
        Self {
            store,
            entries: RwLock::new(HashMap::new()),
            allowed: RwLock::new(None),
        }
    }

    /// Only accept inserts signed by one of `keys`. `None` accepts anyone.
    pub fn set_allow_list(&self, keys: Option<impl IntoIterator<Item = PublicKey>>) {
        *self.allowed.write().expect("lock poisoned") = keys.map(|k| k.into_iter().collect());
    }

    /// Number of keys with at least one entry.
    pub fn owner_count(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Total entries across all keys.
    pub fn entry_count(&self) -> usize {
        self.entries
            .read()
            .expect("lock poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }

    fn is_allowed(&self, pubkey: &PublicKey) -> bool {
        match &*self.allowed.read().expect("lock poisoned") {
            Some(keys) => keys.contains(pubkey),
            None => true,
        }
    }
}

#[async_trait]
impl IndexService for InMemoryIndex {
    async fn list(&self, pubkey: &PublicKey) -> IndexResult<Vec<String>> {
        let map = self.entries.read().expect("lock poisoned");
        Ok(map.get(pubkey).cloned().unwrap_or_default())
    }

    async fn insert(&self, request: &InsertRequest) -> IndexResult<InsertAck> {
        let owner = recover_public_key(&request.digest(), &request.signature)
            .map_err(|e| IndexError::Remote(format!("signature verification failed: {e}")))?;
        if !self.is_allowed(&owner) {
            return Err(IndexError::Remote(format!("unauthorized key {owner}")));
        }

        let proof_bytes =
            serde_json::to_vec(request).map_err(|e| IndexError::Serialization(e.to_string()))?;
        let proof = self.store.store(&proof_bytes).await?;
        let entry = IndexEntry::new(ENTRY_VERSION, request.cid, proof).to_string();

        self.entries
            .write()
            .expect("lock poisoned")
            .entry(owner)
            .or_default()
            .push(entry.clone());
        debug!(owner = %owner, %entry, "index entry appended");

        Ok(InsertAck {
            status: "ok".into(),
            path: format!("{}/{}", owner.to_hex(), entry),
        })
    }
}

impl std::fmt::Debug for InMemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryIndex")
            .field("owners", &self.owner_count())
            .field("entries", &self.entry_count())
            .finish()
    }
}
