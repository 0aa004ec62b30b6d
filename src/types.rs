use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::PushError;

/// Length of a P-256 public key in uncompressed SEC1 form (`0x04 || x || y`).
pub const PUBLIC_KEY_BYTES: usize = 65;

/// Length of a P-256 private scalar.
pub const PRIVATE_KEY_BYTES: usize = 32;

/// SEC1 marker byte for an uncompressed point.
pub const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// Length of the per-helper salt.
pub const SALT_BYTES: usize = 16;

/// Length of the subscriber's auth secret.
pub const AUTH_SECRET_BYTES: usize = 16;

/// Raw ECDH output length for P-256.
pub const SHARED_SECRET_BYTES: usize = 32;

/// HMAC-SHA256 output length; also the HKDF PRK length and the single-block expand limit.
pub const HMAC_OUTPUT_BYTES: usize = 32;

/// AES-128-GCM content-encryption key length.
pub const CONTENT_ENCRYPTION_KEY_BYTES: usize = 16;

/// AES-GCM nonce (IV) length (96 bits).
pub const NONCE_BYTES: usize = 12;

/// AES-GCM tag length (128 bits).
pub const AES_GCM_TAG_BYTES: usize = 16;

/// Length of the big-endian padding-length header prepended to every record.
pub const PADDING_HEADER_BYTES: usize = 2;

// ============================================================================
// Wire records
// ============================================================================

/// Subscriber key material as handed out by the browser's push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberKeys {
    /// Base64url P-256 public key of the user agent (65 bytes).
    pub p256dh: String,
    /// Base64url auth secret (16 bytes).
    pub auth: String,
}

/// A browser push subscription (`PushSubscription.toJSON()`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default)]
    pub expiration_time: Option<u64>,
    pub keys: SubscriberKeys,
}

impl PushSubscription {
    /// Parse a subscription from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, PushError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Server key pair in wire form: base64url public point and private scalar.
///
/// Missing fields deserialize to empty strings so that the factory can report
/// `MissingServerKeys` instead of a generic JSON error.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerKeys {
    #[serde(default)]
    pub public_key: String,
    #[serde(default)]
    pub private_key: String,
}

impl std::fmt::Debug for ServerKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKeys")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Options for `EncryptionHelperFactory::generate_helper`.
///
/// Absent fields are generated fresh: a new P-256 key pair and a random salt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperOptions {
    #[serde(default)]
    pub server_keys: Option<ServerKeys>,
    /// Base64url salt (16 bytes).
    #[serde(default)]
    pub salt: Option<String>,
}

impl HelperOptions {
    /// Parse options from JSON, e.g. `{"serverKeys": {...}, "salt": "..."}`.
    pub fn from_json(json: &str) -> Result<Self, PushError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// Derived material and output
// ============================================================================

/// Per-message keys derived from the HKDF schedule. Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct EncryptionKeys {
    pub content_encryption_key: [u8; CONTENT_ENCRYPTION_KEY_BYTES],
    pub nonce: [u8; NONCE_BYTES],
}

impl std::fmt::Debug for EncryptionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKeys").finish_non_exhaustive()
    }
}

/// Result of `encrypt_message`: everything needed to build the push request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    /// AES-GCM output: ciphertext followed by the 16-byte tag.
    pub cipher_text: Vec<u8>,
    /// Base64url salt (the `Encryption: salt=` header value).
    pub salt: String,
    /// Base64url server public key (the `Crypto-Key: dh=` header value).
    pub public_server_key: String,
}
