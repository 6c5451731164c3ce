use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Multihash code for sha2-256.
pub const SHA2_256_CODE: u8 = 0x12;
/// Digest length of sha2-256.
pub const SHA2_256_LEN: u8 = 0x20;
/// Length of an encoded sha2-256 multihash (code + length + digest).
pub const MULTIHASH_LEN: usize = 34;

/// Content-addressed identifier for a stored payload.
///
/// A `ContentId` is a sha2-256 multihash (`0x12 0x20 || digest`) rendered as
/// base-58 (bitcoin alphabet), the `Qm…` form. Identical bytes always produce
/// the same identifier regardless of who stored them.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId([u8; MULTIHASH_LEN]);

impl ContentId {
    /// Wrap a raw sha2-256 digest.
    pub fn from_digest(digest: [u8; 32]) -> Self {
        let mut bytes = [0u8; MULTIHASH_LEN];
        bytes[0] = SHA2_256_CODE;
        bytes[1] = SHA2_256_LEN;
        bytes[2..].copy_from_slice(&digest);
        Self(bytes)
    }

    /// Parse from raw multihash bytes.
    pub fn from_multihash(bytes: &[u8]) -> Result<Self, TypeError> {
        if bytes.len() != MULTIHASH_LEN {
            return Err(TypeError::InvalidLength {
                expected: MULTIHASH_LEN,
                actual: bytes.len(),
            });
        }
        if bytes[0] != SHA2_256_CODE || bytes[1] != SHA2_256_LEN {
            return Err(TypeError::UnsupportedMultihash {
                code: bytes[0],
                len: bytes[1],
            });
        }
        let mut arr = [0u8; MULTIHASH_LEN];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse from the base-58 string form.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| TypeError::InvalidBase58(e.to_string()))?;
        Self::from_multihash(&bytes)
    }

    /// The raw multihash bytes, as signed into index insert buffers.
    pub fn as_bytes(&self) -> &[u8; MULTIHASH_LEN] {
        &self.0
    }

    /// The sha2-256 digest without the multihash header.
    pub fn digest(&self) -> &[u8] {
        &self.0[2..]
    }

    /// Base-58 string form.
    pub fn to_base58(&self) -> String {
        bs58::encode(self.0).into_string()
    }

    /// Short form for log lines (first 10 base-58 characters).
    pub fn short(&self) -> String {
        let mut s = self.to_base58();
        s.truncate(10);
        s
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.short())
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

impl FromStr for ContentId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.to_base58()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const TEST_CID: &str = "QmcziropQqSUDbNfAkYBwsLQXdEVf9N88Nqz4K1dfKeQGL";

    #[test]
    fn parse_known_identifier() {
        let id = ContentId::parse(TEST_CID).unwrap();
        assert_eq!(id.as_bytes()[0], SHA2_256_CODE);
        assert_eq!(id.as_bytes()[1], SHA2_256_LEN);
        assert_eq!(id.to_base58(), TEST_CID);
    }

    #[test]
    fn display_is_base58() {
        let id = ContentId::from_digest([7u8; 32]);
        let display = format!("{id}");
        assert!(display.starts_with("Qm"));
        assert_eq!(display, id.to_base58());
    }

    #[test]
    fn digest_strips_header() {
        let id = ContentId::from_digest([9u8; 32]);
        assert_eq!(id.digest(), &[9u8; 32]);
    }

    #[test]
    fn rejects_invalid_base58() {
        // '0' and 'l' are not in the bitcoin alphabet.
        let err = ContentId::parse("Qm0l").unwrap_err();
        assert!(matches!(err, TypeError::InvalidBase58(_)));
    }

    #[test]
    fn rejects_short_input() {
        let err = ContentId::parse("a").unwrap_err();
        assert!(matches!(err, TypeError::InvalidLength { expected: 34, .. }));
    }

    #[test]
    fn rejects_foreign_multihash() {
        let mut bytes = *ContentId::from_digest([1u8; 32]).as_bytes();
        bytes[0] = 0x1e;
        let err = ContentId::from_multihash(&bytes).unwrap_err();
        assert_eq!(err, TypeError::UnsupportedMultihash { code: 0x1e, len: 0x20 });
    }

    #[test]
    fn serde_uses_string_form() {
        let id = ContentId::parse(TEST_CID).unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{TEST_CID}\""));
        let parsed: ContentId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_rejects_garbage() {
        assert!(serde_json::from_str::<ContentId>("\"not-a-cid\"").is_err());
    }

    proptest! {
        #[test]
        fn string_form_roundtrips(digest in any::<[u8; 32]>()) {
            let id = ContentId::from_digest(digest);
            prop_assert_eq!(ContentId::parse(&id.to_base58()).unwrap(), id);
        }
    }
}
