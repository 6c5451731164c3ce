use std::collections::HashSet;

use perma_index::InsertAck;
use perma_types::ContentId;
use tracing::debug;

use crate::error::{CrdtError, CrdtResult};
use crate::grow_only::GrowOnlySet;

/// Two-phase set: an `added` and a `removed` grow-only set.
///
/// Membership is `added - removed` as of the last sync. Removal inserts the
/// member's bytes into `removed`; because identifiers depend only on content,
/// the removed copy carries the same identifier as the original.
/// An element, once removed, never comes back.
#[derive(Clone, Debug)]
pub struct TwoPhaseSet {
    added: GrowOnlySet,
    removed: GrowOnlySet,
    cache: Vec<ContentId>,
}

impl TwoPhaseSet {
    pub fn new(added: GrowOnlySet, removed: GrowOnlySet) -> Self {
        Self {
            added,
            removed,
            cache: Vec::new(),
        }
    }

    /// Members at the last sync, in `added` order.
    pub fn index(&self) -> Vec<ContentId> {
        self.cache.clone()
    }

    /// Fetch a member by its base-58 identifier.
    pub async fn get(&self, id: &str) -> CrdtResult<Vec<u8>> {
        let cid = self.lookup(id)?;
        Ok(self.added.index_client().store().fetch(&cid).await?)
    }

    pub async fn insert(&self, data: &[u8]) -> CrdtResult<InsertAck> {
        self.added.insert(data).await
    }

    /// Mark a current member as removed.
    pub async fn remove(&self, id: &str) -> CrdtResult<InsertAck> {
        let data = self.get(id).await?;
        self.removed.insert(&data).await
    }

    /// Sync both halves concurrently, then recompute membership.
    pub async fn sync(&mut self) -> CrdtResult<()> {
        tokio::try_join!(self.added.sync(), self.removed.sync())?;
        let removed: HashSet<ContentId> = self.removed.index().into_iter().collect();
        self.cache = self
            .added
            .index()
            .into_iter()
            .filter(|cid| !removed.contains(cid))
            .collect();
        debug!(
            added = self.added.len(),
            removed = removed.len(),
            len = self.cache.len(),
            "two-phase set synced"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn added(&self) -> &GrowOnlySet {
        &self.added
    }

    pub fn removed(&self) -> &GrowOnlySet {
        &self.removed
    }

    fn lookup(&self, id: &str) -> CrdtResult<ContentId> {
        ContentId::parse(id)
            .ok()
            .filter(|cid| self.cache.contains(cid))
            .ok_or_else(|| CrdtError::IndexOutOfRange(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{backend, signer_set, Unreachable};
    use perma_crypto::{ContentHasher, LocalSigner};
    use perma_index::{IndexClient, IndexError};
    use perma_store::StoreError;

    fn two_phase(index: &Arc<IndexClient>) -> TwoPhaseSet {
        TwoPhaseSet::new(signer_set(index), signer_set(index))
    }

    #[tokio::test]
    async fn removed_elements_are_excluded() {
        let (_, index) = backend();
        let mut set = two_phase(&index);
        let a = ContentHasher::hash(b"A");
        let b = ContentHasher::hash(b"B");

        set.insert(b"A").await.unwrap();
        set.insert(b"B").await.unwrap();
        set.sync().await.unwrap();
        assert_eq!(set.index(), vec![a, b]);

        set.remove(&a.to_base58()).await.unwrap();
        // Not visible until the next sync.
        assert_eq!(set.len(), 2);

        set.sync().await.unwrap();
        assert_eq!(set.index(), vec![b]);
        assert!(matches!(
            set.get(&a.to_base58()).await,
            Err(CrdtError::IndexOutOfRange(_))
        ));
        assert_eq!(set.get(&b.to_base58()).await.unwrap(), b"B");
    }

    #[tokio::test]
    async fn removal_is_permanent() {
        let (_, index) = backend();
        let mut set = two_phase(&index);
        let a = ContentHasher::hash(b"A");

        set.insert(b"A").await.unwrap();
        set.sync().await.unwrap();
        set.remove(&a.to_base58()).await.unwrap();
        set.insert(b"A").await.unwrap();
        set.sync().await.unwrap();
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn remove_requires_membership() {
        let (_, index) = backend();
        let mut set = two_phase(&index);
        set.sync().await.unwrap();

        let unknown = ContentHasher::hash(b"ghost").to_base58();
        assert!(matches!(set.remove(&unknown).await, Err(CrdtError::IndexOutOfRange(_))));
        set.sync().await.unwrap();
        assert!(set.removed().is_empty());
    }

    #[tokio::test]
    async fn removed_copy_has_same_identifier() {
        let (_, index) = backend();
        let mut set = two_phase(&index);
        set.insert(b"A").await.unwrap();
        set.sync().await.unwrap();
        set.remove(&ContentHasher::hash(b"A").to_base58()).await.unwrap();
        set.sync().await.unwrap();
        assert_eq!(set.added().index(), set.removed().index());
    }

    #[tokio::test]
    async fn remove_surfaces_store_failure() {
        let (backend, index) = backend();
        let mut set = two_phase(&index);
        set.insert(b"A").await.unwrap();
        set.sync().await.unwrap();

        backend.set_read_only(true);
        let err = set.remove(&ContentHasher::hash(b"A").to_base58()).await.unwrap_err();
        assert!(matches!(
            err,
            CrdtError::Index(IndexError::Store(StoreError::Remote(_)))
        ));

        backend.set_read_only(false);
        set.sync().await.unwrap();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn sync_fails_when_either_half_fails() {
        let (_, index) = backend();
        let unreachable = Arc::new(IndexClient::new(index.store().clone(), Arc::new(Unreachable)));
        let signer = LocalSigner::generate();
        let removed = GrowOnlySet::new(unreachable, signer.public_key(), signer);
        let mut set = TwoPhaseSet::new(signer_set(&index), removed);

        set.insert(b"A").await.unwrap();
        assert!(matches!(
            set.sync().await,
            Err(CrdtError::Index(IndexError::Remote(_)))
        ));
        assert!(set.is_empty());
    }
}
