//! Content-addressed store client for Permastore.
//!
//! Payloads are stored by content: the identifier of an object is the
//! base-58 sha2-256 multihash of its canonical block encoding. Backends move
//! raw bytes; [`StoreClient`] re-hashes everything it reads, so a store that
//! returns the wrong bytes is detected on the first fetch.
//!
//! # Storage Backends
//!
//! All backends implement the [`ContentStore`] trait:
//!
//! - [`HttpContentStore`] -- the remote permastore API and read mirror
//! - [`InMemoryContentStore`] -- `HashMap`-based store for tests and embedding
//!
//! Endpoints are described by [`ServiceConfig`], passed to each backend
//! explicitly.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub mod traits;

pub use client::StoreClient;
pub use config::{ConfigError, ServiceConfig};
pub use error::{StoreError, StoreResult};
pub use http::{remote_message, HttpContentStore};
pub use memory::InMemoryContentStore;
pub use traits::ContentStore;
