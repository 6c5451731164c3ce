//! Foundation types for Permastore.
//!
//! Every other Permastore crate depends on `perma-types`.
//!
//! # Key Types
//!
//! - [`ContentId`] -- base-58 sha2-256 multihash identifying a stored payload
//! - [`IndexEntry`] -- a parsed `version.content.proof` index entry
//! - [`ProtocolTimestamp`] -- anti-replay seconds since the protocol epoch

pub mod entry;
pub mod error;
pub mod object;
pub mod temporal;

pub use entry::IndexEntry;
pub use error::TypeError;
pub use object::ContentId;
pub use temporal::{ProtocolTimestamp, PROTOCOL_EPOCH};
