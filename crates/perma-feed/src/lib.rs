//! Publish/subscribe feeds of JSON documents on top of the Permastore index.
//!
//! A feed is the index of one public key read as a sequence of JSON
//! documents. Documents can be published in the clear or wrapped in an
//! AES-128-CBC [`EncryptedEnvelope`]; readers holding the key get the
//! plaintext back from [`Feed::list`].

pub mod envelope;
pub mod error;
pub mod feed;

pub use envelope::{possibly_decrypt, EncryptedEnvelope};
pub use error::{FeedError, FeedResult};
pub use feed::Feed;
