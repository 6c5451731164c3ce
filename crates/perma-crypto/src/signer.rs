use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};

/// Length of a compressed SEC1 secp256k1 public key.
pub const COMPRESSED_KEY_LEN: usize = 33;

/// secp256k1 public key identifying an index owner.
///
/// Accepts compressed (33-byte) or uncompressed (65-byte) SEC1 input and is
/// always rendered in compressed form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey([u8; COMPRESSED_KEY_LEN]);

impl PublicKey {
    /// Parse SEC1 bytes in either encoding.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let key = k256::PublicKey::from_sec1_bytes(bytes).map_err(|_| SignerError::InvalidKey)?;
        Ok(Self::from_k256(&key))
    }

    /// Parse a hex-encoded SEC1 key.
    pub fn from_hex(s: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(s).map_err(|e| SignerError::InvalidHex(e.to_string()))?;
        Self::from_sec1_bytes(&bytes)
    }

    fn from_k256(key: &k256::PublicKey) -> Self {
        let point = key.to_encoded_point(true);
        let mut bytes = [0u8; COMPRESSED_KEY_LEN];
        bytes.copy_from_slice(point.as_bytes());
        Self(bytes)
    }

    /// Compressed SEC1 bytes.
    pub fn as_bytes(&self) -> &[u8; COMPRESSED_KEY_LEN] {
        &self.0
    }

    /// Uncompressed SEC1 bytes (65 bytes, `0x04` prefix).
    pub fn to_uncompressed(&self) -> Vec<u8> {
        // The bytes were validated on construction.
        k256::PublicKey::from_sec1_bytes(&self.0)
            .map(|key| key.to_encoded_point(false).as_bytes().to_vec())
            .unwrap_or_default()
    }

    /// Compressed hex form, as sent to the index service.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({}...)", hex::encode(&self.0[..6]))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for PublicKey {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = SignerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_hex()
    }
}

/// A recoverable ECDSA signature in its wire shape.
///
/// `signature` is the hex of the 64-byte compact `r || s`; `recovery` is the
/// recovery id needed to derive the signer's public key from the digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverableSignature {
    pub signature: String,
    pub recovery: u8,
}

/// Signer capability: signs a digest without exposing key material.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign a 32-byte digest.
    async fn sign(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError>;
}

/// Signs with a secp256k1 key held in process memory.
#[derive(Clone)]
pub struct LocalSigner {
    key: SigningKey,
}

impl LocalSigner {
    /// Generate a new random key.
    pub fn generate() -> Self {
        Self {
            key: SigningKey::random(&mut rand::thread_rng()),
        }
    }

    /// Create from a raw 32-byte secret.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignerError> {
        let key = SigningKey::from_slice(bytes).map_err(|_| SignerError::InvalidKey)?;
        Ok(Self { key })
    }

    /// Create from a hex-encoded secret.
    pub fn from_hex(s: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(s).map_err(|e| SignerError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// The public key matching this signer.
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_k256(&k256::PublicKey::from(self.key.verifying_key()))
    }

    /// Hex-encoded secret, for key export.
    pub fn secret_hex(&self) -> String {
        hex::encode(self.key.to_bytes())
    }

    fn sign_digest(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError> {
        let (signature, recovery) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| SignerError::SigningFailed(e.to_string()))?;
        Ok(RecoverableSignature {
            signature: hex::encode(signature.to_bytes()),
            recovery: recovery.to_byte(),
        })
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn sign(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError> {
        self.sign_digest(digest)
    }
}

impl fmt::Debug for LocalSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LocalSigner(<redacted>)")
    }
}

/// A remote key custodian able to sign on behalf of a derived key.
#[async_trait]
pub trait KeyVault: Send + Sync {
    /// Sign `digest_hex` with the key at `derivation` within `scope`.
    async fn sign_secp256k1(
        &self,
        derivation: &str,
        digest_hex: &str,
        scope: &str,
    ) -> Result<RecoverableSignature, SignerError>;
}

/// Forwards signing requests to a [`KeyVault`].
#[derive(Clone)]
pub struct DelegatedSigner {
    vault: Arc<dyn KeyVault>,
    derivation: String,
    scope: String,
}

impl DelegatedSigner {
    pub const DEFAULT_SCOPE: &'static str = "default";

    pub fn new(vault: Arc<dyn KeyVault>, derivation: impl Into<String>) -> Self {
        Self::with_scope(vault, derivation, Self::DEFAULT_SCOPE)
    }

    pub fn with_scope(
        vault: Arc<dyn KeyVault>,
        derivation: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            vault,
            derivation: derivation.into(),
            scope: scope.into(),
        }
    }

    pub fn derivation(&self) -> &str {
        &self.derivation
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }
}

#[async_trait]
impl Signer for DelegatedSigner {
    async fn sign(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError> {
        self.vault
            .sign_secp256k1(&self.derivation, &hex::encode(digest), &self.scope)
            .await
    }
}

impl fmt::Debug for DelegatedSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedSigner")
            .field("derivation", &self.derivation)
            .field("scope", &self.scope)
            .finish()
    }
}

/// The signer variants a set or feed can be handed.
#[derive(Clone, Debug)]
pub enum SignerCapability {
    Local(LocalSigner),
    Delegated(DelegatedSigner),
}

#[async_trait]
impl Signer for SignerCapability {
    async fn sign(&self, digest: &[u8; 32]) -> Result<RecoverableSignature, SignerError> {
        match self {
            Self::Local(signer) => signer.sign(digest).await,
            Self::Delegated(signer) => signer.sign(digest).await,
        }
    }
}

impl From<LocalSigner> for SignerCapability {
    fn from(signer: LocalSigner) -> Self {
        Self::Local(signer)
    }
}

impl From<DelegatedSigner> for SignerCapability {
    fn from(signer: DelegatedSigner) -> Self {
        Self::Delegated(signer)
    }
}

/// Recover the public key that produced `signature` over `digest`.
pub fn recover_public_key(
    digest: &[u8; 32],
    signature: &RecoverableSignature,
) -> Result<PublicKey, SignerError> {
    let raw = hex::decode(&signature.signature)
        .map_err(|e| SignerError::InvalidHex(e.to_string()))?;
    let sig = Signature::from_slice(&raw).map_err(|_| SignerError::InvalidSignature)?;
    let recovery =
        RecoveryId::from_byte(signature.recovery).ok_or(SignerError::InvalidSignature)?;
    let key = VerifyingKey::recover_from_prehash(digest, &sig, recovery)
        .map_err(|_| SignerError::InvalidSignature)?;
    Ok(PublicKey::from_k256(&k256::PublicKey::from(&key)))
}

/// Errors from signing operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SignerError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid key")]
    InvalidKey,
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("signing failed: {0}")]
    SigningFailed(String),
    #[error("key vault error: {0}")]
    Vault(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LocalVault(LocalSigner);

    #[async_trait]
    impl KeyVault for LocalVault {
        async fn sign_secp256k1(
            &self,
            derivation: &str,
            digest_hex: &str,
            scope: &str,
        ) -> Result<RecoverableSignature, SignerError> {
            if derivation != "m/0" || scope != "default" {
                return Err(SignerError::Vault(format!("unknown key {derivation}@{scope}")));
            }
            let bytes =
                hex::decode(digest_hex).map_err(|e| SignerError::InvalidHex(e.to_string()))?;
            let digest: [u8; 32] = bytes.try_into().map_err(|_| SignerError::InvalidSignature)?;
            self.0.sign(&digest).await
        }
    }

    #[tokio::test]
    async fn sign_and_recover() {
        let signer = LocalSigner::generate();
        let digest = [0x42u8; 32];
        let sig = signer.sign(&digest).await.unwrap();
        assert_eq!(sig.signature.len(), 128);
        assert!(sig.recovery < 4);
        let recovered = recover_public_key(&digest, &sig).unwrap();
        assert_eq!(recovered, signer.public_key());
    }

    #[tokio::test]
    async fn recovery_on_wrong_digest_yields_other_key() {
        let signer = LocalSigner::generate();
        let sig = signer.sign(&[1u8; 32]).await.unwrap();
        match recover_public_key(&[2u8; 32], &sig) {
            Ok(key) => assert_ne!(key, signer.public_key()),
            Err(e) => assert_eq!(e, SignerError::InvalidSignature),
        }
    }

    #[tokio::test]
    async fn delegated_signer_forwards_to_vault() {
        let local = LocalSigner::generate();
        let expected = local.public_key();
        let delegated = DelegatedSigner::new(Arc::new(LocalVault(local)), "m/0");
        let digest = [9u8; 32];
        let sig = delegated.sign(&digest).await.unwrap();
        assert_eq!(recover_public_key(&digest, &sig).unwrap(), expected);
    }

    #[tokio::test]
    async fn delegated_signer_surfaces_vault_errors() {
        let vault = Arc::new(LocalVault(LocalSigner::generate()));
        let delegated = DelegatedSigner::with_scope(vault, "m/0", "other");
        let err = delegated.sign(&[0u8; 32]).await.unwrap_err();
        assert!(matches!(err, SignerError::Vault(_)));
    }

    #[tokio::test]
    async fn capability_dispatches_to_variant() {
        let local = LocalSigner::generate();
        let key = local.public_key();
        let capability = SignerCapability::from(local);
        let digest = [3u8; 32];
        let sig = capability.sign(&digest).await.unwrap();
        assert_eq!(recover_public_key(&digest, &sig).unwrap(), key);
    }

    #[test]
    fn public_key_accepts_both_encodings() {
        let key = LocalSigner::generate().public_key();
        let uncompressed = key.to_uncompressed();
        assert_eq!(uncompressed.len(), 65);
        assert_eq!(PublicKey::from_sec1_bytes(&uncompressed).unwrap(), key);
        assert_eq!(PublicKey::from_hex(&key.to_hex()).unwrap(), key);
        assert_eq!(key.to_hex().len(), 66);
    }

    #[test]
    fn public_key_rejects_garbage() {
        assert!(matches!(PublicKey::from_hex("a").unwrap_err(), SignerError::InvalidHex(_)));
        assert_eq!(PublicKey::from_hex("0102").unwrap_err(), SignerError::InvalidKey);
    }

    #[test]
    fn local_signer_hex_roundtrip() {
        let signer = LocalSigner::generate();
        let restored = LocalSigner::from_hex(&signer.secret_hex()).unwrap();
        assert_eq!(restored.public_key(), signer.public_key());
    }

    #[test]
    fn local_signer_rejects_bad_secret() {
        assert_eq!(LocalSigner::from_bytes(&[0u8; 32]).unwrap_err(), SignerError::InvalidKey);
        assert!(LocalSigner::from_hex("zz").is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let debug = format!("{:?}", LocalSigner::generate());
        assert!(debug.contains("redacted"));
    }
}
