//! Subscriber (user agent) side of the aesgcm encoding.
//!
//! Re-derives the same key schedule with the roles swapped: the ECDH uses the
//! subscriber's private key and the server key from the envelope, and the
//! context still lists the subscriber key first.
//!
//! Record: [padding length:2 BE][padding][payload]

use std::sync::Arc;

use zeroize::Zeroize;

use crate::base64url::{base64url_decode, base64url_encode};
use crate::context::build_context;
use crate::error::PushError;
use crate::helper::{derive_message_keys, derive_prk};
use crate::keys::{export_public_key, import_public_key, EcKeyPair};
use crate::provider::CryptoProvider;
use crate::types::{
    EncryptedEnvelope, SubscriberKeys, AUTH_SECRET_BYTES, PADDING_HEADER_BYTES, SALT_BYTES,
};

/// Holds a subscriber's key pair and auth secret; decrypts envelopes.
pub struct PushReceiver {
    provider: Arc<dyn CryptoProvider>,
    key_pair: EcKeyPair,
    auth_secret: [u8; AUTH_SECRET_BYTES],
}

impl PushReceiver {
    pub fn new(
        provider: Arc<dyn CryptoProvider>,
        key_pair: EcKeyPair,
        auth_secret: [u8; AUTH_SECRET_BYTES],
    ) -> Self {
        Self {
            provider,
            key_pair,
            auth_secret,
        }
    }

    /// Create a receiver with a fresh key pair and random auth secret.
    pub fn generate(provider: Arc<dyn CryptoProvider>) -> Result<Self, PushError> {
        let key_pair = EcKeyPair::from_secret(provider.generate_secret_key()?);
        let mut auth_secret = [0u8; AUTH_SECRET_BYTES];
        provider.fill_random(&mut auth_secret)?;
        Ok(Self::new(provider, key_pair, auth_secret))
    }

    pub fn key_pair(&self) -> &EcKeyPair {
        &self.key_pair
    }

    /// The record to hand to the application server.
    pub fn subscriber_keys(&self) -> Result<SubscriberKeys, PushError> {
        Ok(SubscriberKeys {
            p256dh: base64url_encode(&export_public_key(&self.key_pair.public_key)?),
            auth: base64url_encode(&self.auth_secret),
        })
    }

    /// Decrypt an envelope and strip the padding header.
    pub fn decrypt_payload(&self, envelope: &EncryptedEnvelope) -> Result<Vec<u8>, PushError> {
        let server_bytes = base64url_decode(&envelope.public_server_key)?;
        let server_key = import_public_key(&server_bytes)?;
        let salt = base64url_decode(&envelope.salt)?;
        if salt.len() != SALT_BYTES {
            return Err(PushError::MissingSalt { got: salt.len() });
        }

        let provider = self.provider.as_ref();
        let mut shared = provider.derive_bits(&self.key_pair.private_key, &server_key)?;
        let prk = derive_prk(provider, &shared, &self.auth_secret);
        shared.zeroize();
        let mut prk = prk?;

        let client_bytes = export_public_key(&self.key_pair.public_key)?;
        let context = build_context(&client_bytes, &server_bytes);
        let keys = derive_message_keys(provider, &prk, &salt, &context);
        prk.zeroize();
        let keys = keys?;

        let mut record = provider.aes_gcm_decrypt(
            &keys.content_encryption_key,
            &keys.nonce,
            &envelope.cipher_text,
        )?;
        tracing::trace!(record_len = record.len(), "decrypted push record");

        let payload = strip_padding(&record);
        record.zeroize();
        payload
    }

    /// Decrypt an envelope carrying UTF-8 text.
    pub fn decrypt_message(&self, envelope: &EncryptedEnvelope) -> Result<String, PushError> {
        Ok(String::from_utf8(self.decrypt_payload(envelope)?)?)
    }
}

impl std::fmt::Debug for PushReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PushReceiver")
            .field("key_pair", &self.key_pair)
            .finish_non_exhaustive()
    }
}

impl Drop for PushReceiver {
    fn drop(&mut self) {
        self.auth_secret.zeroize();
    }
}

fn strip_padding(record: &[u8]) -> Result<Vec<u8>, PushError> {
    if record.len() < PADDING_HEADER_BYTES {
        return Err(PushError::DecryptionFailed(format!(
            "record too short: {} bytes",
            record.len()
        )));
    }
    let padding = u16::from_be_bytes([record[0], record[1]]) as usize;
    let start = PADDING_HEADER_BYTES + padding;
    if start > record.len() {
        return Err(PushError::DecryptionFailed(format!(
            "invalid padding: claimed length {} exceeds available data {}",
            padding,
            record.len() - PADDING_HEADER_BYTES
        )));
    }
    Ok(record[start..].to_vec())
}
