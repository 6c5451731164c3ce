//! AES-128-CBC helpers for documents and the combined key/IV encoding.
//!
//! Keys and IVs are always 16 bytes. The combined encoding is base-58 of
//! `key || iv` (32 bytes), so existing encoded values stay readable.

use std::fmt;

use aes::Aes128;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Cipher identifier carried in encrypted envelopes.
pub const AES_128_CBC: &str = "aes-128-cbc";

/// Key and IV length in bytes.
pub const BLOCK_LEN: usize = 16;

type Encryptor = cbc::Encryptor<Aes128>;
type Decryptor = cbc::Decryptor<Aes128>;

/// A 128-bit symmetric key.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey([u8; BLOCK_LEN]);

impl SymmetricKey {
    /// Generate a random key.
    pub fn generate() -> Self {
        Self(random_block())
    }

    pub fn from_bytes(bytes: [u8; BLOCK_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a hex-encoded 16-byte key.
    pub fn from_hex(s: &str) -> Result<Self, CipherError> {
        decode_block_hex(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey(<redacted>)")
    }
}

/// A 128-bit CBC initialization vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InitVector([u8; BLOCK_LEN]);

impl InitVector {
    /// Generate a fresh random IV.
    pub fn generate() -> Self {
        Self(random_block())
    }

    pub fn from_bytes(bytes: [u8; BLOCK_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self, CipherError> {
        decode_block_hex(s).map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// A key and IV pair distributed out of band as one base-58 string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyIv {
    pub key: SymmetricKey,
    pub iv: InitVector,
}

impl KeyIv {
    pub fn generate() -> Self {
        Self {
            key: SymmetricKey::generate(),
            iv: InitVector::generate(),
        }
    }

    /// base58(key || iv).
    pub fn encode(&self) -> String {
        let mut buf = [0u8; BLOCK_LEN * 2];
        buf[..BLOCK_LEN].copy_from_slice(self.key.as_bytes());
        buf[BLOCK_LEN..].copy_from_slice(self.iv.as_bytes());
        bs58::encode(buf).into_string()
    }

    /// Inverse of [`KeyIv::encode`]; anything but 32 decoded bytes is rejected.
    pub fn decode(s: &str) -> Result<Self, CipherError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| CipherError::InvalidKeyIv(e.to_string()))?;
        if bytes.len() != BLOCK_LEN * 2 {
            return Err(CipherError::InvalidKeyIv(format!(
                "expected {} bytes, got {}",
                BLOCK_LEN * 2,
                bytes.len()
            )));
        }
        let mut key = [0u8; BLOCK_LEN];
        let mut iv = [0u8; BLOCK_LEN];
        key.copy_from_slice(&bytes[..BLOCK_LEN]);
        iv.copy_from_slice(&bytes[BLOCK_LEN..]);
        Ok(Self {
            key: SymmetricKey(key),
            iv: InitVector(iv),
        })
    }
}

/// Ciphertext plus the encoded key/IV needed to open it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedObject {
    pub ciphertext: Vec<u8>,
    pub key_iv: String,
}

/// AES-128-CBC with PKCS#7 padding.
pub fn aes128_cbc_encrypt(plaintext: &[u8], key: &SymmetricKey, iv: &InitVector) -> Vec<u8> {
    Encryptor::new(key.as_bytes().into(), iv.as_bytes().into())
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext)
}

/// Inverse of [`aes128_cbc_encrypt`]. A wrong key almost always shows up as
/// bad padding.
pub fn aes128_cbc_decrypt(
    ciphertext: &[u8],
    key: &SymmetricKey,
    iv: &InitVector,
) -> Result<Vec<u8>, CipherError> {
    Decryptor::new(key.as_bytes().into(), iv.as_bytes().into())
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CipherError::DecryptFailure)
}

/// Serialize `data` as JSON and encrypt it under a fresh random key and IV.
pub fn encrypt_object<T: Serialize>(data: &T) -> Result<EncryptedObject, CipherError> {
    let plaintext =
        serde_json::to_vec(data).map_err(|e| CipherError::Serialization(e.to_string()))?;
    let key_iv = KeyIv::generate();
    Ok(EncryptedObject {
        ciphertext: aes128_cbc_encrypt(&plaintext, &key_iv.key, &key_iv.iv),
        key_iv: key_iv.encode(),
    })
}

/// Decrypt an [`encrypt_object`] result and deserialize it.
pub fn decrypt_object<T: DeserializeOwned>(
    ciphertext: &[u8],
    key_iv: &str,
) -> Result<T, CipherError> {
    let KeyIv { key, iv } = KeyIv::decode(key_iv)?;
    let plaintext = aes128_cbc_decrypt(ciphertext, &key, &iv)?;
    serde_json::from_slice(&plaintext).map_err(|e| CipherError::Serialization(e.to_string()))
}

fn random_block() -> [u8; BLOCK_LEN] {
    let mut block = [0u8; BLOCK_LEN];
    rand::thread_rng().fill_bytes(&mut block);
    block
}

fn decode_block_hex(s: &str) -> Result<[u8; BLOCK_LEN], CipherError> {
    let bytes = hex::decode(s).map_err(|e| CipherError::InvalidHex(e.to_string()))?;
    bytes.try_into().map_err(|v: Vec<u8>| {
        CipherError::InvalidHex(format!("expected {BLOCK_LEN} bytes, got {}", v.len()))
    })
}

/// Errors from symmetric encryption.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CipherError {
    #[error("unknown cipher: {0}")]
    UnknownCipher(String),
    #[error("decryption failed")]
    DecryptFailure,
    #[error("invalid key/iv encoding: {0}")]
    InvalidKeyIv(String),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}
