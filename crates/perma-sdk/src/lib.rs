//! High-level SDK for Permastore.
//!
//! [`Permastore`] wires a content store and an index service into the
//! clients, sets, and feeds built on top of them. Use
//! [`Permastore::connect`] for the HTTP services or
//! [`Permastore::in_memory`] for a fully local instance.

pub mod error;
pub mod permastore;

pub use error::{SdkError, SdkResult};
pub use permastore::Permastore;

// Re-export key types
pub use perma_crdt::{CrdtError, GrowOnlySet, TwoPhaseSet};
pub use perma_crypto::{
    ContentHasher, DelegatedSigner, KeyIv, KeyVault, LocalSigner, PublicKey, Signer,
    SignerCapability, SymmetricKey,
};
pub use perma_feed::{EncryptedEnvelope, Feed};
pub use perma_index::{IndexClient, InsertAck, StagedInsert};
pub use perma_store::{ServiceConfig, StoreClient};
pub use perma_types::{ContentId, IndexEntry, ProtocolTimestamp};
