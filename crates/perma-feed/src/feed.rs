use std::sync::Arc;

use perma_crypto::{PublicKey, Signer, SymmetricKey};
use perma_index::{IndexClient, InsertAck};
use perma_types::IndexEntry;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::envelope::{possibly_decrypt, EncryptedEnvelope};
use crate::error::{FeedError, FeedResult};

/// Publishes JSON documents to a key's index and reads them back.
#[derive(Clone, Debug)]
pub struct Feed {
    index: Arc<IndexClient>,
}

impl Feed {
    pub fn new(index: Arc<IndexClient>) -> Self {
        Self { index }
    }

    /// Publish raw bytes.
    pub async fn publish_raw(&self, data: &[u8], signer: &dyn Signer) -> FeedResult<InsertAck> {
        Ok(self.index.insert(data, signer).await?)
    }

    /// Publish `document` as JSON.
    pub async fn publish_plaintext<T: Serialize + ?Sized>(
        &self,
        document: &T,
        signer: &dyn Signer,
    ) -> FeedResult<InsertAck> {
        let data =
            serde_json::to_vec(document).map_err(|e| FeedError::Serialization(e.to_string()))?;
        self.publish_raw(&data, signer).await
    }

    /// Publish `document` inside an AES-128-CBC envelope.
    pub async fn publish_encrypted<T: Serialize + ?Sized>(
        &self,
        document: &T,
        signer: &dyn Signer,
        key: &SymmetricKey,
    ) -> FeedResult<InsertAck> {
        let envelope = EncryptedEnvelope::seal(document, key)?;
        self.publish_plaintext(&envelope.to_document(), signer).await
    }

    /// Documents published by `owner`, in index order.
    ///
    /// With a key, envelopes are replaced by their plaintext. Entries that do
    /// not parse, and documents that are not JSON or fail to decrypt, are
    /// skipped. Listing and fetch errors are returned.
    pub async fn list(
        &self,
        owner: &PublicKey,
        key: Option<&SymmetricKey>,
    ) -> FeedResult<Vec<Value>> {
        let entries = self.index.list_raw(owner).await?;
        let mut documents = Vec::with_capacity(entries.len());
        for raw in &entries {
            let entry = match IndexEntry::parse(raw) {
                Ok(entry) => entry,
                Err(error) => {
                    debug!(entry = %raw, %error, "skipping malformed feed entry");
                    continue;
                }
            };
            let data = self.index.store().fetch(&entry.content).await?;
            match decode(&data, key) {
                Ok(document) => documents.push(document),
                Err(error) => debug!(cid = %entry.content, %error, "skipping feed entry"),
            }
        }
        debug!(%owner, listed = entries.len(), returned = documents.len(), "feed listed");
        Ok(documents)
    }
}

fn decode(data: &[u8], key: Option<&SymmetricKey>) -> FeedResult<Value> {
    let document: Value =
        serde_json::from_slice(data).map_err(|e| FeedError::Serialization(e.to_string()))?;
    match key {
        Some(key) => possibly_decrypt(document, key),
        None => Ok(document),
    }
}
