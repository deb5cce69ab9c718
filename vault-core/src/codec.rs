//! Encrypted envelope codec.
//!
//! This module provides:
//! - [`VaultKey`], the single symmetric key supplied by the caller
//! - XChaCha20-Poly1305 encryption with random 192-bit nonces
//! - The `protectedData` string format: base64(`nonce || ciphertext || tag`)
//!
//! The codec adds no framing beyond what the AEAD needs. Callers hand it an
//! already-serialized payload string and get an opaque string back.

use base64::{engine::general_purpose::STANDARD, Engine};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::CipherError;

/// Nonce size for XChaCha20-Poly1305 (192 bits = 24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Key size for XChaCha20-Poly1305 (256 bits = 32 bytes).
pub const KEY_SIZE: usize = 32;

/// Poly1305 authentication tag size.
pub const TAG_SIZE: usize = 16;

/// Symmetric key for cipher payloads.
///
/// Key derivation and rotation happen elsewhere; this type only holds the
/// final 256-bit key and wipes it on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VaultKey([u8; KEY_SIZE]);

impl VaultKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Wrap a key slice, checking its length.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; KEY_SIZE] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    /// Generate a random key.
    pub fn random() -> Result<Self, CipherError> {
        let mut bytes = [0u8; KEY_SIZE];
        getrandom::getrandom(&mut bytes)
            .map_err(|e| CipherError::KeyGeneration(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

// Don't leak keys in debug output
impl std::fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VaultKey([REDACTED])")
    }
}

/// Encrypt a serialized payload into a `protectedData` string.
///
/// A fresh random nonce is used for every call, so encrypting the same
/// plaintext twice yields different output.
pub fn encrypt(key: &VaultKey, plaintext: &str) -> Result<String, CipherError> {
    let mut nonce_bytes = [0u8; NONCE_SIZE];
    getrandom::getrandom(&mut nonce_bytes).map_err(|e| CipherError::Encryption(e.to_string()))?;
    let nonce = XNonce::from_slice(&nonce_bytes);

    let cipher = XChaCha20Poly1305::new_from_slice(key.as_bytes())
        .map_err(|e| CipherError::Encryption(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CipherError::Encryption("aead encrypt failed".into()))?;

    // Prepend nonce to ciphertext for self-describing format
    let mut sealed = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    sealed.extend_from_slice(&nonce_bytes);
    sealed.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(sealed))
}

/// Decrypt a `protectedData` string back into the serialized payload.
///
/// Any failure (bad base64, truncated input, wrong key, tampering,
/// non-UTF-8 plaintext) is reported as [`CipherError::Decryption`].
pub fn decrypt(key: &VaultKey, protected: &str) -> Result<String, CipherError> {
    let sealed = STANDARD
        .decode(protected)
        .map_err(|_| CipherError::Decryption)?;

    if sealed.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CipherError::Decryption);
    }

    let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_SIZE);
    let nonce = XNonce::from_slice(nonce_bytes);

    let cipher =
        XChaCha20Poly1305::new_from_slice(key.as_bytes()).map_err(|_| CipherError::Decryption)?;

    let plaintext = cipher
        .decrypt(nonce, ciphertext)
        .map_err(|_| CipherError::Decryption)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::Decryption)
}
