//! Cipher model: the plaintext record and its conversions.
//!
//! A [`Cipher`] carries exactly one payload variant inside [`CipherData`].
//! The wire discriminant is derived from that variant, so a tag that
//! disagrees with its payload cannot be constructed through this type.
//! [`CipherParts`] exists for callers that still hold the loose
//! "tag plus three optional slots" shape; converting it validates the slots.
//!
//! ```text
//! Cipher ──to_encrypted──▶ EncryptedCipher ──from_encrypted──▶ Cipher
//!   data → JSON → codec::encrypt      codec::decrypt → JSON → data
//! ```

use serde::{Deserialize, Serialize};
use vault_types::{CipherId, CipherType, CollectionId, EncryptedCipher, UserId};

use crate::codec::{self, VaultKey};
use crate::CipherError;

/// Whether a custom field should be masked when displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Shown as-is
    #[default]
    Text,
    /// Masked in any UI; no difference at the encryption level
    Hidden,
}

/// A user-defined name/value pair attached to a payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomField {
    /// Field label
    pub name: String,
    /// Display hint
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    /// Field value
    pub value: String,
}

impl CustomField {
    /// Create a plain text field.
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: FieldType::Text,
            value: value.to_string(),
        }
    }

    /// Create a field that should be masked when displayed.
    pub fn hidden(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: FieldType::Hidden,
            value: value.to_string(),
        }
    }
}

impl std::fmt::Debug for CustomField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self.field_type {
            FieldType::Text => self.value.as_str(),
            FieldType::Hidden => "[REDACTED]",
        };
        f.debug_struct("CustomField")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("value", &value)
            .finish()
    }
}

/// A password that used to be current, and when it stopped being so.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PasswordHistoryEntry {
    /// The prior password value
    pub password: String,
    /// Unix seconds at which it was replaced
    pub last_used: u64,
}

impl std::fmt::Debug for PasswordHistoryEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHistoryEntry")
            .field("password", &"[REDACTED]")
            .field("last_used", &self.last_used)
            .finish()
    }
}

/// Login payload.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoginData {
    /// Display name (required)
    pub name: String,
    /// Account e-mail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Current password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Prior passwords, oldest first
    #[serde(default)]
    pub password_history: Vec<PasswordHistoryEntry>,
    /// Sites or apps this login applies to
    #[serde(default)]
    pub uris: Vec<String>,
    /// Two-factor (TOTP) secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub totp: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Custom fields
    #[serde(default)]
    pub fields: Vec<CustomField>,
}

impl LoginData {
    /// Create a login with only a name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Replace the current password, moving the old one into the history.
    pub fn rotate_password(&mut self, new_password: &str, now: u64) {
        if let Some(old) = self.password.replace(new_password.to_string()) {
            self.password_history.push(PasswordHistoryEntry {
                password: old,
                last_used: now,
            });
        }
    }
}

impl std::fmt::Debug for LoginData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginData")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("password_history", &self.password_history)
            .field("uris", &self.uris)
            .field("totp", &self.totp.as_ref().map(|_| "[REDACTED]"))
            .field("notes", &self.notes)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Secure note payload. All three fields are required on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SecureNoteData {
    /// Note title
    pub title: String,
    /// Note body
    pub note: String,
    /// Custom fields (may be empty, must be present)
    pub fields: Vec<CustomField>,
}

/// Payment card payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CardData {
    /// Display name (required)
    pub name: String,
    /// Name printed on the card (required)
    pub cardholder_name: String,
    /// Card number (required)
    pub number: String,
    /// Expiry month
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_month: Option<String>,
    /// Expiry year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp_year: Option<String>,
    /// CVV code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Custom fields
    #[serde(default)]
    pub fields: Vec<CustomField>,
}

impl std::fmt::Debug for CardData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardData")
            .field("name", &self.name)
            .field("cardholder_name", &self.cardholder_name)
            .field("number", &"[REDACTED]")
            .field("exp_month", &self.exp_month)
            .field("exp_year", &self.exp_year)
            .field("code", &self.code.as_ref().map(|_| "[REDACTED]"))
            .field("notes", &self.notes)
            .field("fields", &self.fields)
            .finish()
    }
}

/// The one active payload of a cipher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CipherData {
    /// Login payload
    Login(LoginData),
    /// Secure note payload
    SecureNote(SecureNoteData),
    /// Card payload
    Card(CardData),
}

impl CipherData {
    /// The discriminant matching this variant.
    pub fn cipher_type(&self) -> CipherType {
        match self {
            CipherData::Login(_) => CipherType::Login,
            CipherData::SecureNote(_) => CipherType::SecureNote,
            CipherData::Card(_) => CipherType::Card,
        }
    }

    /// Serialize only the inner payload, without any tag.
    fn to_json(&self) -> Result<String, CipherError> {
        let json = match self {
            CipherData::Login(data) => serde_json::to_string(data),
            CipherData::SecureNote(data) => serde_json::to_string(data),
            CipherData::Card(data) => serde_json::to_string(data),
        };
        json.map_err(|e| CipherError::Encryption(e.to_string()))
    }

    /// Deserialize a payload into the shape selected by `cipher_type`.
    ///
    /// Payload structs reject unknown keys, so another type's payload never
    /// decodes as a partial copy of this one.
    fn from_json(cipher_type: CipherType, json: &str) -> Result<Self, CipherError> {
        let malformed = |e: serde_json::Error| {
            CipherError::MalformedPayload(format!("{:?} payload: {}", cipher_type, e))
        };
        match cipher_type {
            CipherType::Login => serde_json::from_str(json)
                .map(CipherData::Login)
                .map_err(malformed),
            CipherType::SecureNote => serde_json::from_str(json)
                .map(CipherData::SecureNote)
                .map_err(malformed),
            CipherType::Card => serde_json::from_str(json)
                .map(CipherData::Card)
                .map_err(malformed),
        }
    }
}

/// A decrypted cipher record. Lives in memory only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cipher {
    /// Cipher identifier
    pub id: CipherId,
    /// Owning user
    pub owner: UserId,
    /// The active payload
    pub data: CipherData,
    /// Collection the cipher is filed under
    pub collection: Option<CollectionId>,
    /// Favorite flag
    pub favorite: bool,
    /// Re-prompt flag (stored and round-tripped, no effect here)
    pub re_prompt: bool,
    /// Creation time, unix seconds (None until persisted)
    pub created: Option<u64>,
    /// Last modification time, unix seconds (None until persisted)
    pub last_modified: Option<u64>,
}

impl Cipher {
    /// Create a new, not-yet-persisted cipher with a random ID.
    pub fn new(owner: UserId, data: CipherData) -> Self {
        Self {
            id: CipherId::random(),
            owner,
            data,
            collection: None,
            favorite: false,
            re_prompt: false,
            created: None,
            last_modified: None,
        }
    }

    /// The discriminant of the active payload.
    pub fn cipher_type(&self) -> CipherType {
        self.data.cipher_type()
    }

    /// Decrypt an envelope into a plaintext cipher.
    ///
    /// Absent `type`, `favorite` and `rePrompt` are read as Login, false and
    /// false. Cleartext metadata is copied unchanged.
    ///
    /// # Errors
    ///
    /// - [`CipherError::Decryption`] if `protectedData` fails authentication
    /// - [`CipherError::MalformedPayload`] if the discriminant is unknown or
    ///   the plaintext does not fit the shape it selects
    pub fn from_encrypted(encrypted: &EncryptedCipher, key: &VaultKey) -> Result<Self, CipherError> {
        let json = codec::decrypt(key, &encrypted.protected_data)?;

        let cipher_type = encrypted
            .cipher_type()
            .map_err(|e| CipherError::MalformedPayload(e.to_string()))?;
        let data = CipherData::from_json(cipher_type, &json)?;

        Ok(Self {
            id: encrypted.id.clone(),
            owner: encrypted.owner.clone(),
            data,
            collection: encrypted.collection.clone(),
            favorite: encrypted.is_favorite(),
            re_prompt: encrypted.needs_re_prompt(),
            created: encrypted.created,
            last_modified: encrypted.last_modified,
        })
    }

    /// Encrypt this cipher into its envelope form.
    ///
    /// Only the active payload is encrypted. The output always carries
    /// explicit `type`, `favorite` and `rePrompt` values.
    pub fn to_encrypted(&self, key: &VaultKey) -> Result<EncryptedCipher, CipherError> {
        let json = self.data.to_json()?;
        let protected_data = codec::encrypt(key, &json)?;

        Ok(EncryptedCipher {
            id: self.id.clone(),
            owner: self.owner.clone(),
            cipher_type: Some(self.cipher_type().code()),
            protected_data,
            collection: self.collection.clone(),
            favorite: Some(self.favorite),
            re_prompt: Some(self.re_prompt),
            created: self.created,
            last_modified: self.last_modified,
        })
    }
}

/// Loose cipher shape: a discriminant plus one optional slot per variant.
///
/// Convert with [`Cipher::try_from`]; exactly the slot matching
/// `cipher_type` must be populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherParts {
    /// Cipher identifier
    pub id: CipherId,
    /// Owning user
    pub owner: UserId,
    /// Claimed discriminant
    pub cipher_type: CipherType,
    /// Login slot
    pub login: Option<LoginData>,
    /// Secure note slot
    pub secure_note: Option<SecureNoteData>,
    /// Card slot
    pub card: Option<CardData>,
    /// Collection the cipher is filed under
    pub collection: Option<CollectionId>,
    /// Favorite flag
    pub favorite: bool,
    /// Re-prompt flag
    pub re_prompt: bool,
    /// Creation time, unix seconds
    pub created: Option<u64>,
    /// Last modification time, unix seconds
    pub last_modified: Option<u64>,
}

impl CipherParts {
    /// Validate and encrypt in one step.
    pub fn to_encrypted(&self, key: &VaultKey) -> Result<EncryptedCipher, CipherError> {
        Cipher::try_from(self.clone())?.to_encrypted(key)
    }

    fn populated(&self) -> Vec<CipherType> {
        let mut present = Vec::new();
        if self.login.is_some() {
            present.push(CipherType::Login);
        }
        if self.secure_note.is_some() {
            present.push(CipherType::SecureNote);
        }
        if self.card.is_some() {
            present.push(CipherType::Card);
        }
        present
    }
}

impl TryFrom<CipherParts> for Cipher {
    type Error = CipherError;

    fn try_from(parts: CipherParts) -> Result<Self, Self::Error> {
        let present = parts.populated();
        let expected = parts.cipher_type;
        let mismatch = || CipherError::InvalidCipherState {
            expected,
            present: present.clone(),
        };

        if present.len() != 1 {
            return Err(mismatch());
        }

        let data = match (expected, parts.login, parts.secure_note, parts.card) {
            (CipherType::Login, Some(login), None, None) => CipherData::Login(login),
            (CipherType::SecureNote, None, Some(note), None) => CipherData::SecureNote(note),
            (CipherType::Card, None, None, Some(card)) => CipherData::Card(card),
            _ => return Err(mismatch()),
        };

        Ok(Self {
            id: parts.id,
            owner: parts.owner,
            data,
            collection: parts.collection,
            favorite: parts.favorite,
            re_prompt: parts.re_prompt,
            created: parts.created,
            last_modified: parts.last_modified,
        })
    }
}

impl From<Cipher> for CipherParts {
    fn from(cipher: Cipher) -> Self {
        let cipher_type = cipher.cipher_type();
        let (login, secure_note, card) = match cipher.data {
            CipherData::Login(data) => (Some(data), None, None),
            CipherData::SecureNote(data) => (None, Some(data), None),
            CipherData::Card(data) => (None, None, Some(data)),
        };
        Self {
            id: cipher.id,
            owner: cipher.owner,
            cipher_type,
            login,
            secure_note,
            card,
            collection: cipher.collection,
            favorite: cipher.favorite,
            re_prompt: cipher.re_prompt,
            created: cipher.created,
            last_modified: cipher.last_modified,
        }
    }
}
