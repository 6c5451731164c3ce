use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use perma_crypto::{PublicKey, Signer};
use perma_store::StoreClient;
use perma_types::{ContentId, IndexEntry, ProtocolTimestamp};
use tracing::{debug, info};

use crate::auth::{insert_digest, InsertAck, InsertRequest};
use crate::error::{IndexError, IndexResult};
use crate::traits::IndexService;

/// Hook deciding whether an entry's proof object is acceptable.
#[async_trait]
pub trait ProofVerifier: Send + Sync {
    /// Return `IndexError::ProofRejected` to refuse the entry.
    async fn verify(&self, entry: &IndexEntry, proof: &[u8]) -> IndexResult<()>;
}

/// Accepts every proof. Proofs are still fetched, and so integrity-checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct UncheckedProofs;

#[async_trait]
impl ProofVerifier for UncheckedProofs {
    async fn verify(&self, _entry: &IndexEntry, _proof: &[u8]) -> IndexResult<()> {
        Ok(())
    }
}

/// A payload that is in the content store but not yet in any index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StagedInsert {
    cid: ContentId,
}

impl StagedInsert {
    /// Stage an identifier that was stored earlier.
    pub fn for_existing(cid: ContentId) -> Self {
        Self { cid }
    }

    pub fn cid(&self) -> &ContentId {
        &self.cid
    }
}

/// Client for the authenticated index: stores payloads, signs inserts, and
/// lists entries.
#[derive(Clone)]
pub struct IndexClient {
    store: StoreClient,
    service: Arc<dyn IndexService>,
    verifier: Arc<dyn ProofVerifier>,
}

impl IndexClient {
    pub fn new(store: StoreClient, service: Arc<dyn IndexService>) -> Self {
        Self {
            store,
            service,
            verifier: Arc::new(UncheckedProofs),
        }
    }

    /// Replace the proof verifier used by [`fetch_entry`](Self::fetch_entry).
    pub fn with_verifier(mut self, verifier: Arc<dyn ProofVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn store(&self) -> &StoreClient {
        &self.store
    }

    pub fn service(&self) -> &Arc<dyn IndexService> {
        &self.service
    }

    /// Store `payload` and index it under the signer's key.
    pub async fn insert(&self, payload: &[u8], signer: &dyn Signer) -> IndexResult<InsertAck> {
        let staged = self.stage(payload).await?;
        self.commit(staged, signer).await
    }

    /// Upload `payload` without indexing it.
    pub async fn stage(&self, payload: &[u8]) -> IndexResult<StagedInsert> {
        let cid = self.store.store(payload).await?;
        Ok(StagedInsert { cid })
    }

    /// Index a staged payload, timestamped now.
    pub async fn commit(
        &self,
        staged: StagedInsert,
        signer: &dyn Signer,
    ) -> IndexResult<InsertAck> {
        self.commit_at(staged, signer, ProtocolTimestamp::now()).await
    }

    /// Index a staged payload with an explicit timestamp.
    pub async fn commit_at(
        &self,
        staged: StagedInsert,
        signer: &dyn Signer,
        timestamp: ProtocolTimestamp,
    ) -> IndexResult<InsertAck> {
        let digest = insert_digest(timestamp, &staged.cid);
        let signature = signer.sign(&digest).await?;
        let request = InsertRequest {
            timestamp,
            cid: staged.cid,
            signature,
        };
        let ack = self.service.insert(&request).await?;
        info!(cid = %staged.cid, path = %ack.path, "indexed object");
        Ok(ack)
    }

    /// Entries for `pubkey`, in index order.
    ///
    /// Fails with `IndexError::MalformedEntry` if any entry does not parse.
    pub async fn list(&self, pubkey: &PublicKey) -> IndexResult<Vec<IndexEntry>> {
        parse_entries(&self.list_raw(pubkey).await?)
    }

    /// Entries for `pubkey` as the service returned them, unparsed.
    pub async fn list_raw(&self, pubkey: &PublicKey) -> IndexResult<Vec<String>> {
        let raw = self.service.list(pubkey).await?;
        debug!(%pubkey, count = raw.len(), "listed index");
        Ok(raw)
    }

    /// Entries for several keys.
    pub async fn list_batched(
        &self,
        pubkeys: &[PublicKey],
    ) -> IndexResult<BTreeMap<PublicKey, Vec<IndexEntry>>> {
        self.service
            .list_batched(pubkeys)
            .await?
            .into_iter()
            .map(|(key, raw)| Ok((key, parse_entries(&raw)?)))
            .collect()
    }

    /// Fetch an entry's proof, run it past the verifier, then fetch the content.
    pub async fn fetch_entry(&self, entry: &IndexEntry) -> IndexResult<Vec<u8>> {
        let proof = self.store.fetch(&entry.proof).await?;
        self.verifier.verify(entry, &proof).await?;
        Ok(self.store.fetch(&entry.content).await?)
    }
}

impl std::fmt::Debug for IndexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexClient").finish_non_exhaustive()
    }
}

fn parse_entries(raw: &[String]) -> IndexResult<Vec<IndexEntry>> {
    raw.iter()
        .map(|s| IndexEntry::parse(s).map_err(IndexError::from))
        .collect()
}
