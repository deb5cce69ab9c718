//! Error types for cipher conversion.

use thiserror::Error;
use vault_types::CipherType;

/// Errors raised while encrypting or decrypting a cipher.
///
/// Every variant is terminal for the operation that raised it.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Encryption failed.
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed: wrong key, tampered or truncated ciphertext.
    #[error("decryption failed: authentication error")]
    Decryption,

    /// Decrypted content does not match the payload shape for its discriminant.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Payload slots do not match the type discriminant.
    #[error("invalid cipher state: type is {expected:?} but populated payloads are {present:?}")]
    InvalidCipherState {
        /// Discriminant the cipher claims.
        expected: CipherType,
        /// Payload slots actually populated.
        present: Vec<CipherType>,
    },

    /// Key generation failed.
    #[error("key generation failed: {0}")]
    KeyGeneration(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_display_names_both_sides() {
        let err = CipherError::InvalidCipherState {
            expected: CipherType::Card,
            present: vec![CipherType::Login],
        };
        assert_eq!(
            err.to_string(),
            "invalid cipher state: type is Card but populated payloads are [Login]"
        );
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CipherError>();
    }
}
