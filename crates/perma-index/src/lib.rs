//! Authenticated index client for Permastore.
//!
//! The index maps a secp256k1 public key to an append-only list of entries
//! of the form `version.content.proof`. Appending requires a signature over
//! `timestamp || cid`, so only the key holder can write under its key.
//!
//! # Services
//!
//! All backends implement the [`IndexService`] trait:
//!
//! - [`HttpIndexService`] -- the remote permastore index API
//! - [`InMemoryIndex`] -- local emulation for tests and embedding
//!
//! [`IndexClient`] combines a service with a [`StoreClient`](perma_store::StoreClient)
//! and a [`ProofVerifier`] hook.

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use auth::{insert_digest, InsertAck, InsertRequest};
pub use client::{IndexClient, ProofVerifier, StagedInsert, UncheckedProofs};
pub use error::{IndexError, IndexResult};
pub use http::HttpIndexService;
pub use memory::{InMemoryIndex, ENTRY_VERSION};
pub use traits::IndexService;
