use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use perma_crypto::ContentHasher;
use perma_types::ContentId;

use crate::error::{StoreError, StoreResult};
use crate::traits::ContentStore;

/// In-memory, HashMap-based content store.
///
/// Intended for tests and offline use. Identifiers are computed with the
/// canonical hasher, so they match what the remote store would assign.
pub struct InMemoryContentStore {
    objects: RwLock<HashMap<ContentId, Vec<u8>>>,
    read_only: AtomicBool,
}

impl InMemoryContentStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            read_only: AtomicBool::new(false),
        }
    }

    /// Refuse further writes with a remote-style error.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Replace the bytes stored under `id` without rehashing them.
    ///
    /// Simulates a misbehaving store; readers should detect the mismatch.
    pub fn tamper(&self, id: &ContentId, bytes: impl Into<Vec<u8>>) {
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(*id, bytes.into());
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.objects.read().expect("lock poisoned").contains_key(id)
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.objects.write().expect("lock poisoned").clear();
    }
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn put(&self, data: &[u8]) -> StoreResult<ContentId> {
        if self.read_only.load(Ordering::SeqCst) {
            return Err(StoreError::Remote("store is read-only".into()));
        }
        let id = ContentHasher::hash(data);
        let mut map = self.objects.write().expect("lock poisoned");
        map.entry(id).or_insert_with(|| data.to_vec());
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> StoreResult<Vec<u8>> {
        let map = self.objects.read().expect("lock poisoned");
        map.get(id).cloned().ok_or(StoreError::NotFound(*id))
    }
}

impl std::fmt::Debug for InMemoryContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryContentStore")
            .field("object_count", &self.len())
            .field("read_only", &self.read_only.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_roundtrip() {
        let store = InMemoryContentStore::new();
        let id = store.put(b"TEST").await.unwrap();
        assert_eq!(id.to_base58(), "QmcziropQqSUDbNfAkYBwsLQXdEVf9N88Nqz4K1dfKeQGL");
        assert_eq!(store.get(&id).await.unwrap(), b"TEST");
    }

    #[tokio::test]
    async fn put_is_idempotent() {
        let store = InMemoryContentStore::new();
        let a = store.put(b"same").await.unwrap();
        let b = store.put(b"same").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_object_is_not_found() {
        let store = InMemoryContentStore::new();
        let id = ContentHasher::hash(b"never stored");
        assert!(matches!(store.get(&id).await, Err(StoreError::NotFound(x)) if x == id));
    }

    #[tokio::test]
    async fn read_only_refuses_writes() {
        let store = InMemoryContentStore::new();
        store.set_read_only(true);
        let err = store.put(b"data").await.unwrap_err();
        assert!(matches!(err, StoreError::Remote(ref m) if m == "store is read-only"));
        store.set_read_only(false);
        assert!(store.put(b"data").await.is_ok());
    }

    #[tokio::test]
    async fn bookkeeping() {
        let store = InMemoryContentStore::default();
        assert!(store.is_empty());
        let a = store.put(b"abc").await.unwrap();
        let b = store.put(b"de").await.unwrap();
        assert!(store.contains(&a));
        assert!(store.contains(&b));
        assert_eq!(store.len(), 2);
        store.clear();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn tamper_replaces_bytes() {
        let store = InMemoryContentStore::new();
        let id = store.put(b"original").await.unwrap();
        store.tamper(&id, b"forged".to_vec());
        assert_eq!(store.get(&id).await.unwrap(), b"forged");
    }

    #[test]
    fn debug_output() {
        let store = InMemoryContentStore::new();
        let debug = format!("{store:?}");
        assert!(debug.contains("InMemoryContentStore"));
        assert!(debug.contains("object_count: 0"));
    }
}
