use perma_crypto::{ContentHasher, RecoverableSignature};
use perma_types::{ContentId, ProtocolTimestamp};
use serde::{Deserialize, Serialize};

/// Digest signed to authorize an insert.
///
/// sha2-256 over `timestamp (4 bytes LE) || multihash bytes of cid`.
pub fn insert_digest(timestamp: ProtocolTimestamp, cid: &ContentId) -> [u8; 32] {
    let mut buf = Vec::with_capacity(4 + cid.as_bytes().len());
    buf.extend_from_slice(&timestamp.to_le_bytes());
    buf.extend_from_slice(cid.as_bytes());
    ContentHasher::raw_hash(&buf)
}

/// Authenticated request asking the index to append `cid` under the
/// signer's public key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRequest {
    pub timestamp: ProtocolTimestamp,
    pub cid: ContentId,
    pub signature: RecoverableSignature,
}

impl InsertRequest {
    /// The digest this request's signature must cover.
    pub fn digest(&self) -> [u8; 32] {
        insert_digest(self.timestamp, &self.cid)
    }
}

/// Acknowledgement returned by the index service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertAck {
    pub status: String,
    pub path: String,
}
