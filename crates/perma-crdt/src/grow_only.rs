use std::collections::HashSet;
use std::sync::Arc;

use perma_crypto::{PublicKey, SignerCapability};
use perma_index::{IndexClient, InsertAck};
use perma_types::{ContentId, IndexEntry};
use tracing::debug;

use crate::error::{CrdtError, CrdtResult};

/// Grow-only set of content identifiers backed by one key's index.
///
/// The local view only changes on [`sync`](Self::sync); inserts go straight
/// to the index and show up after the next sync.
#[derive(Clone)]
pub struct GrowOnlySet {
    owner: PublicKey,
    signer: SignerCapability,
    index: Arc<IndexClient>,
    cache: Vec<ContentId>,
}

impl GrowOnlySet {
    /// A set owned by `owner`, written through `signer`.
    ///
    /// The signer is expected to sign as `owner`; writes made with another
    /// key land in that key's index instead.
    pub fn new(
        index: Arc<IndexClient>,
        owner: PublicKey,
        signer: impl Into<SignerCapability>,
    ) -> Self {
        Self {
            owner,
            signer: signer.into(),
            index,
            cache: Vec::new(),
        }
    }

    pub fn owner(&self) -> &PublicKey {
        &self.owner
    }

    pub fn index_client(&self) -> &Arc<IndexClient> {
        &self.index
    }

    /// Identifiers seen at the last sync, in index order.
    pub fn index(&self) -> Vec<ContentId> {
        self.cache.clone()
    }

    /// Reload the local view from the index.
    ///
    /// Entries that do not parse are left out of the view.
    pub async fn sync(&mut self) -> CrdtResult<()> {
        let entries = self.index.list_raw(&self.owner).await?;
        let mut seen = HashSet::with_capacity(entries.len());
        self.cache = entries
            .iter()
            .filter_map(|raw| match IndexEntry::parse(raw) {
                Ok(entry) => Some(entry.content),
                Err(error) => {
                    debug!(owner = %self.owner, entry = %raw, %error, "skipping malformed entry");
                    None
                }
            })
            .filter(|cid| seen.insert(*cid))
            .collect();
        debug!(owner = %self.owner, len = self.cache.len(), "grow-only set synced");
        Ok(())
    }

    /// Fetch a member by its base-58 identifier.
    pub async fn get(&self, id: &str) -> CrdtResult<Vec<u8>> {
        let cid = self.lookup(id)?;
        Ok(self.index.store().fetch(&cid).await?)
    }

    /// Store `data` and append it to the owner's index.
    pub async fn insert(&self, data: &[u8]) -> CrdtResult<InsertAck> {
        Ok(self.index.insert(data, &self.signer).await?)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn contains(&self, id: &ContentId) -> bool {
        self.cache.contains(id)
    }

    fn lookup(&self, id: &str) -> CrdtResult<ContentId> {
        ContentId::parse(id)
            .ok()
            .filter(|cid| self.contains(cid))
            .ok_or_else(|| CrdtError::IndexOutOfRange(id.to_string()))
    }
}

impl std::fmt::Debug for GrowOnlySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowOnlySet")
            .field("owner", &self.owner)
            .field("len", &self.cache.len())
            .finish()
    }
}
