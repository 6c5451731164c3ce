use perma_types::ContentId;
use sha2::{Digest, Sha256};

/// UnixFS `Data.Type` value for a file node.
const UNIXFS_FILE: u64 = 2;

/// Canonical content hasher.
///
/// A payload is wrapped as a single UnixFS file node inside a link-less
/// dag-pb `PBNode`, and the node bytes are hashed with sha2-256. This is the
/// same encoding the remote store uses for single-block objects, so a
/// producer, the store, and a verifying reader all derive the same
/// [`ContentId`] for the same bytes, independent of who stored them.
pub struct ContentHasher;

impl ContentHasher {
    /// Compute the content identifier of a payload.
    pub fn hash(data: &[u8]) -> ContentId {
        ContentId::from_digest(Self::raw_hash(&Self::encode_block(data)))
    }

    /// Hash a serializable value as JSON.
    pub fn hash_json<T: serde::Serialize>(value: &T) -> Result<ContentId, HasherError> {
        let data =
            serde_json::to_vec(value).map_err(|e| HasherError::Serialization(e.to_string()))?;
        Ok(Self::hash(&data))
    }

    /// Verify that data produces the expected identifier.
    pub fn verify(data: &[u8], expected: &ContentId) -> bool {
        Self::hash(data) == *expected
    }

    /// Plain sha2-256 without any block encoding.
    pub fn raw_hash(data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }

    /// Encode a payload as the dag-pb block whose hash is its identifier.
    pub fn encode_block(data: &[u8]) -> Vec<u8> {
        // UnixFS Data message: Type (1), Data (2, omitted when empty), filesize (3).
        let mut unixfs = Vec::with_capacity(data.len() + 16);
        put_key(&mut unixfs, 1, WIRE_VARINT);
        put_varint(&mut unixfs, UNIXFS_FILE);
        if !data.is_empty() {
            put_key(&mut unixfs, 2, WIRE_LEN);
            put_varint(&mut unixfs, data.len() as u64);
            unixfs.extend_from_slice(data);
        }
        put_key(&mut unixfs, 3, WIRE_VARINT);
        put_varint(&mut unixfs, data.len() as u64);

        // PBNode with only the Data (1) field set.
        let mut node = Vec::with_capacity(unixfs.len() + 8);
        put_key(&mut node, 1, WIRE_LEN);
        put_varint(&mut node, unixfs.len() as u64);
        node.extend_from_slice(&unixfs);
        node
    }
}

const WIRE_VARINT: u8 = 0;
const WIRE_LEN: u8 = 2;

fn put_key(buf: &mut Vec<u8>, field: u8, wire_type: u8) {
    buf.push((field << 3) | wire_type);
}

fn put_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Errors from hashing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum HasherError {
    #[error("serialization error: {0}")]
    Serialization(String),
}
