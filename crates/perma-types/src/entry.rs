//! Authenticated index entries.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::object::ContentId;

/// One entry in an owner's append-only index.
///
/// On the wire an entry is three dot-separated fields:
/// `version.contentHash.proofHash`. The proof object is the signed insert
/// request as persisted by the index service.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IndexEntry {
    /// Version tag assigned by the index service.
    pub version: String,
    /// Identifier of the referenced payload.
    pub content: ContentId,
    /// Identifier of the insertion proof object.
    pub proof: ContentId,
}

impl IndexEntry {
    /// Create an entry from its parts.
    pub fn new(version: impl Into<String>, content: ContentId, proof: ContentId) -> Self {
        Self {
            version: version.into(),
            content,
            proof,
        }
    }

    /// Parse the wire form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let mut parts = s.split('.');
        let (Some(version), Some(content), Some(proof), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TypeError::MalformedEntry(s.to_string()));
        };
        if version.is_empty() {
            return Err(TypeError::MalformedEntry(s.to_string()));
        }
        Ok(Self {
            version: version.to_string(),
            content: ContentId::parse(content)?,
            proof: ContentId::parse(proof)?,
        })
    }
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.version, self.content, self.proof)
    }
}

impl FromStr for IndexEntry {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for IndexEntry {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<IndexEntry> for String {
    fn from(entry: IndexEntry) -> Self {
        entry.to_string()
    }
}
