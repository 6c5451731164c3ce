//! The `{"encrypted": {...}}` wrapper used for encrypted feed documents.

use perma_crypto::{
    aes128_cbc_decrypt, aes128_cbc_encrypt, CipherError, InitVector, SymmetricKey, AES_128_CBC,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FeedError, FeedResult};

/// Encrypted document body. `iv` and `ciphertext` are hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    pub cipher: String,
    pub iv: String,
    pub ciphertext: String,
}

#[derive(Serialize, Deserialize)]
struct Wrapper {
    encrypted: EncryptedEnvelope,
}

impl EncryptedEnvelope {
    /// Encrypt `document` as JSON under `key` with a fresh IV.
    pub fn seal<T: Serialize + ?Sized>(document: &T, key: &SymmetricKey) -> FeedResult<Self> {
        let plaintext =
            serde_json::to_vec(document).map_err(|e| FeedError::Serialization(e.to_string()))?;
        let iv = InitVector::generate();
        Ok(Self {
            cipher: AES_128_CBC.to_string(),
            iv: iv.to_hex(),
            ciphertext: hex::encode(aes128_cbc_encrypt(&plaintext, key, &iv)),
        })
    }

    /// Decrypt and parse the wrapped document.
    pub fn open(&self, key: &SymmetricKey) -> FeedResult<Value> {
        if self.cipher != AES_128_CBC {
            return Err(CipherError::UnknownCipher(self.cipher.clone()).into());
        }
        let iv = InitVector::from_hex(&self.iv)?;
        let ciphertext =
            hex::decode(&self.ciphertext).map_err(|e| CipherError::InvalidHex(e.to_string()))?;
        let plaintext = aes128_cbc_decrypt(&ciphertext, key, &iv)?;
        serde_json::from_slice(&plaintext).map_err(|e| FeedError::Serialization(e.to_string()))
    }

    /// The published JSON form, `{"encrypted": {...}}`.
    pub fn to_document(&self) -> Value {
        serde_json::json!({ "encrypted": self })
    }

    /// Extract an envelope from a document, if it is one.
    pub fn from_document(document: &Value) -> Option<FeedResult<Self>> {
        document.get("encrypted")?;
        Some(
            serde_json::from_value::<Wrapper>(document.clone())
                .map(|w| w.encrypted)
                .map_err(|e| FeedError::Serialization(e.to_string())),
        )
    }
}

/// Replace an envelope with its plaintext; other documents pass through.
pub fn possibly_decrypt(document: Value, key: &SymmetricKey) -> FeedResult<Value> {
    match EncryptedEnvelope::from_document(&document) {
        Some(envelope) => envelope?.open(key),
        None => Ok(document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seal_open_roundtrip() {
        let key = SymmetricKey::generate();
        let doc = json!({"hello": "hello2"});
        let envelope = EncryptedEnvelope::seal(&doc, &key).unwrap();
        assert_eq!(envelope.cipher, "aes-128-cbc");
        assert_eq!(envelope.iv.len(), 32);
        assert_eq!(envelope.open(&key).unwrap(), doc);
    }

    #[test]
    fn fresh_iv_each_time() {
        let key = SymmetricKey::generate();
        let doc = json!({"n": 1});
        let a = EncryptedEnvelope::seal(&doc, &key).unwrap();
        let b = EncryptedEnvelope::seal(&doc, &key).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn document_shape() {
        let key = SymmetricKey::generate();
        let envelope = EncryptedEnvelope::seal(&json!(1), &key).unwrap();
        let doc = envelope.to_document();
        assert_eq!(doc["encrypted"]["cipher"], "aes-128-cbc");
        let back = EncryptedEnvelope::from_document(&doc).unwrap().unwrap();
        assert_eq!(back, envelope);
    }

    #[test]
    fn plain_documents_pass_through() {
        let key = SymmetricKey::generate();
        let doc = json!({"hello": "hello1"});
        assert!(EncryptedEnvelope::from_document(&doc).is_none());
        assert_eq!(possibly_decrypt(doc.clone(), &key).unwrap(), doc);
    }

    #[test]
    fn unknown_cipher_rejected() {
        let key = SymmetricKey::generate();
        let mut envelope = EncryptedEnvelope::seal(&json!({}), &key).unwrap();
        envelope.cipher = "rot13".into();
        assert!(matches!(
            envelope.open(&key),
            Err(FeedError::Cipher(CipherError::UnknownCipher(ref c))) if c == "rot13"
        ));
    }

    #[test]
    fn malformed_envelopes_fail() {
        let key = SymmetricKey::generate();
        let bad_shape = json!({"encrypted": "nope"});
        assert!(matches!(possibly_decrypt(bad_shape, &key), Err(FeedError::Serialization(_))));

        let bad_hex =
            json!({"encrypted": {"cipher": "aes-128-cbc", "iv": "zz", "ciphertext": "00"}});
        assert!(matches!(possibly_decrypt(bad_hex, &key), Err(FeedError::Cipher(_))));
    }
}
