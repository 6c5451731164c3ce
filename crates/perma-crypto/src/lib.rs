//! Cryptographic primitives for Permastore.
//!
//! Provides the canonical content hasher, the secp256k1 signer capability,
//! and the AES-128-CBC document helpers.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod cipher;
pub mod hasher;
pub mod signer;

pub use cipher::{
    aes128_cbc_decrypt, aes128_cbc_encrypt, decrypt_object, encrypt_object, CipherError,
    EncryptedObject, InitVector, KeyIv, SymmetricKey, AES_128_CBC,
};
pub use hasher::{ContentHasher, HasherError};
pub use signer::{
    recover_public_key, DelegatedSigner, KeyVault, LocalSigner, PublicKey, RecoverableSignature,
    Signer, SignerCapability, SignerError,
};
