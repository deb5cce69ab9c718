//! EncryptedCipher - the wire and at-rest form of a cipher record.

use serde::{Deserialize, Serialize};

use crate::{CipherId, CollectionId, UserId, WireError};

/// Cipher type discriminant selecting which payload shape `protectedData` holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CipherType {
    /// Website or application login
    Login = 0,
    /// Free-form secure note
    SecureNote = 1,
    /// Payment card
    Card = 2,
}

impl CipherType {
    /// Wire value of this discriminant.
    pub fn code(self) -> i64 {
        i64::from(self as u8)
    }
}

impl TryFrom<i64> for CipherType {
    type Error = WireError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CipherType::Login),
            1 => Ok(CipherType::SecureNote),
            2 => Ok(CipherType::Card),
            _ => Err(WireError::UnknownCipherType(value)),
        }
    }
}

/// A cipher as it travels over the wire and sits at rest.
///
/// Only `protected_data` is encrypted. Every other field is cleartext
/// metadata that the server needs for ownership and ordering.
///
/// `cipher_type`, `favorite` and `re_prompt` are optional on the wire for
/// backward compatibility. Use [`EncryptedCipher::normalize`] right after
/// decoding to fill them with their defaults.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedCipher {
    /// Cipher identifier
    pub id: CipherId,
    /// Owning user
    pub owner: UserId,
    /// Raw discriminant (0 = Login when absent). Kept wide so an
    /// out-of-range value fails only this cipher's decryption, not the
    /// whole response.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub cipher_type: Option<i64>,
    /// Base64 AEAD ciphertext of the JSON payload
    pub protected_data: String,
    /// Collection the cipher is filed under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection: Option<CollectionId>,
    /// Favorite flag (false when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
    /// Re-prompt flag (false when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub re_prompt: Option<bool>,
    /// Creation time, unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<u64>,
    /// Last modification time, unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<u64>,
}

impl EncryptedCipher {
    /// Fill absent optional wire fields with their semantic defaults.
    ///
    /// `type` becomes Login (0), `favorite` and `rePrompt` become false.
    /// Fields that are already present are left alone, so applying this
    /// more than once has no further effect.
    pub fn normalize(&mut self) {
        if self.cipher_type.is_none() {
            self.cipher_type = Some(CipherType::Login.code());
        }
        if self.favorite.is_none() {
            self.favorite = Some(false);
        }
        if self.re_prompt.is_none() {
            self.re_prompt = Some(false);
        }
    }

    /// Consuming variant of [`EncryptedCipher::normalize`].
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Raw discriminant, reading an absent value as Login.
    pub fn type_code(&self) -> i64 {
        self.cipher_type.unwrap_or(CipherType::Login.code())
    }

    /// Discriminant as an enum.
    pub fn cipher_type(&self) -> Result<CipherType, WireError> {
        CipherType::try_from(self.type_code())
    }

    /// Favorite flag, reading an absent value as false.
    pub fn is_favorite(&self) -> bool {
        self.favorite.unwrap_or(false)
    }

    /// Re-prompt flag, reading an absent value as false.
    pub fn needs_re_prompt(&self) -> bool {
        self.re_prompt.unwrap_or(false)
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>, WireError> {
        serde_json::to_vec(self).map_err(WireError::Serialization)
    }

    /// Deserialize from JSON bytes. Does not normalize.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WireError> {
        serde_json::from_slice(bytes).map_err(WireError::Deserialization)
    }
}

// protected_data is ciphertext, but there is no reason to put it in logs
impl std::fmt::Debug for EncryptedCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptedCipher")
            .field("id", &self.id)
            .field("owner", &self.owner)
            .field("cipher_type", &self.cipher_type)
            .field(
                "protected_data",
                &format!("[{} chars REDACTED]", self.protected_data.len()),
            )
            .field("collection", &self.collection)
            .field("favorite", &self.favorite)
            .field("re_prompt", &self.re_prompt)
            .field("created", &self.created)
            .field("last_modified", &self.last_modified)
            .finish()
    }
}
