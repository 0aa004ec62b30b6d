use thiserror::Error;

/// Wire-form key validation failures raised by the key adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyFormatError {
    #[error("public key must be {expected} bytes, got {got}")]
    PublicKeyLength { expected: usize, got: usize },

    #[error("public key must start with 0x04, got {0:#04x}")]
    PublicKeyPrefix(u8),

    #[error("private key must be {expected} bytes, got {got}")]
    PrivateKeyLength { expected: usize, got: usize },
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(#[from] KeyFormatError),

    #[error("Bad server keys: both publicKey and privateKey are required")]
    MissingServerKeys,

    /// The salt is absent or not exactly 16 bytes; `got` is its length.
    #[error("Bad salt value: expected 16 bytes, got {got}")]
    MissingSalt { got: usize },

    #[error("Invalid auth secret length: expected {expected} bytes, got {got}")]
    InvalidAuthSecretLength { expected: usize, got: usize },

    #[error("Base64url decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("HKDF expand length {requested} exceeds hash output size {max}")]
    ExpandLength { requested: usize, max: usize },

    #[error("Key import failed: {0}")]
    ImportFailed(String),

    #[error("ECDH derivation failed: {0}")]
    DeriveFailed(String),

    #[error("HMAC failed: {0}")]
    HmacFailed(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Random number generation failed: {0}")]
    RngFailed(String),

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
