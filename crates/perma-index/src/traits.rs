use std::collections::BTreeMap;

use async_trait::async_trait;
use perma_crypto::PublicKey;

use crate::auth::{InsertAck, InsertRequest};
use crate::error::IndexResult;

/// Remote authenticated index: an append-only list of entries per public key.
///
/// Entries are returned as raw wire strings; parsing and proof handling live
/// in [`IndexClient`](crate::IndexClient).
#[async_trait]
pub trait IndexService: Send + Sync {
    /// All entries for `pubkey`, in insertion order. Unknown keys list empty.
    async fn list(&self, pubkey: &PublicKey) -> IndexResult<Vec<String>>;

    /// Submit a signed insert.
    async fn insert(&self, request: &InsertRequest) -> IndexResult<InsertAck>;

    /// Entries for several keys at once.
    async fn list_batched(
        &self,
        pubkeys: &[PublicKey],
    ) -> IndexResult<BTreeMap<PublicKey, Vec<String>>> {
        let mut out = BTreeMap::new();
        for pubkey in pubkeys {
            out.insert(*pubkey, self.list(pubkey).await?);
        }
        Ok(out)
    }
}
