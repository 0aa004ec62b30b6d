//! Web Push payload encryption using the `aesgcm` content encoding.
//!
//! An application server holds a P-256 key pair and a salt. For each
//! subscriber it runs ECDH against the subscriber's `p256dh` key, mixes in the
//! subscriber's `auth` secret with HKDF, derives an AES-128-GCM key and nonce
//! bound to both public keys, and encrypts the payload.
//!
//! ```no_run
//! use push_encryption::{EncryptionHelperFactory, HelperOptions, PushSubscription};
//!
//! # fn main() -> Result<(), push_encryption::PushError> {
//! let subscription = PushSubscription::from_json(r#"{
//!     "endpoint": "https://push.example.net/send/abc",
//!     "keys": { "p256dh": "...", "auth": "..." }
//! }"#)?;
//! let helper = EncryptionHelperFactory::default().generate_helper(&HelperOptions::default())?;
//! let envelope = helper.encrypt_message(&subscription.keys, "Hello, world!")?;
//! // POST envelope.cipher_text with
//! //   Content-Encoding: aesgcm
//! //   Encryption: salt=<envelope.salt>
//! //   Crypto-Key: dh=<envelope.public_server_key>
//! # Ok(())
//! # }
//! ```

pub mod base64url;
pub mod context;
pub mod error;
pub mod factory;
pub mod helper;
pub mod hkdf;
pub mod keys;
pub mod provider;
pub mod receiver;
pub mod types;

pub use base64url::{base64url_decode, base64url_encode};
pub use context::{build_cek_info, build_context, build_nonce_info, AUTH_INFO};
pub use error::{KeyFormatError, PushError};
pub use factory::EncryptionHelperFactory;
pub use helper::EncryptionHelper;
pub use hkdf::Hkdf;
pub use keys::{
    export_private_key, export_public_key, import_key_pair, import_private_key, import_public_key,
    import_public_key_base64url, validate_public_key_bytes, EcKeyPair,
};
pub use provider::{CryptoProvider, RustCryptoProvider};
pub use receiver::PushReceiver;
pub use types::{
    EncryptedEnvelope, EncryptionKeys, HelperOptions, PushSubscription, ServerKeys,
    SubscriberKeys, AES_GCM_TAG_BYTES, AUTH_SECRET_BYTES, CONTENT_ENCRYPTION_KEY_BYTES,
    HMAC_OUTPUT_BYTES, NONCE_BYTES, PADDING_HEADER_BYTES, PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES,
    SALT_BYTES, SHARED_SECRET_BYTES,
};
