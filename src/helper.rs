//! Encryption orchestrator: turns a subscriber record and a payload into an
//! aesgcm-encoded envelope.
//!
//! Key schedule:
//!   shared = ECDH(server_private, p256dh)
//!   prk    = HKDF(ikm=shared, salt=auth).generate(authInfo, 32)
//!   cek    = HKDF(ikm=prk, salt=salt).generate(cekInfo, 16)
//!   nonce  = HKDF(ikm=prk, salt=salt).generate(nonceInfo, 12)
//!   record = [padding length:2 BE = 0][payload]
//!   body   = AES-128-GCM(cek, nonce, record)

use std::sync::Arc;

use p256::{PublicKey, SecretKey};
use zeroize::Zeroize;

use crate::base64url::{base64url_decode, base64url_encode};
use crate::context::{build_cek_info, build_context, build_nonce_info, AUTH_INFO};
use crate::error::PushError;
use crate::hkdf::Hkdf;
use crate::keys::{export_public_key, import_public_key, EcKeyPair};
use crate::provider::CryptoProvider;
use crate::types::{
    EncryptedEnvelope, EncryptionKeys, SubscriberKeys, AUTH_SECRET_BYTES,
    CONTENT_ENCRYPTION_KEY_BYTES, HMAC_OUTPUT_BYTES, NONCE_BYTES, PADDING_HEADER_BYTES,
    SALT_BYTES, SHARED_SECRET_BYTES,
};

/// Holds a server key pair and a salt; encrypts messages for subscribers.
///
/// The salt is fixed for the lifetime of the helper, so encrypting the same
/// payload for the same subscriber twice yields identical ciphertext. Build a
/// fresh helper per message when that matters.
pub struct EncryptionHelper {
    provider: Arc<dyn CryptoProvider>,
    server_keys: EcKeyPair,
    salt: [u8; SALT_BYTES],
}

impl EncryptionHelper {
    /// Create a helper from a server key pair and a 16-byte salt.
    pub fn new(
        provider: Arc<dyn CryptoProvider>,
        server_keys: EcKeyPair,
        salt: &[u8],
    ) -> Result<Self, PushError> {
        let salt: [u8; SALT_BYTES] = salt
            .try_into()
            .map_err(|_| PushError::MissingSalt { got: salt.len() })?;
        tracing::debug!("encryption helper ready");
        Ok(Self {
            provider,
            server_keys,
            salt,
        })
    }

    pub fn public_server_key(&self) -> &PublicKey {
        &self.server_keys.public_key
    }

    pub fn private_server_key(&self) -> &SecretKey {
        &self.server_keys.private_key
    }

    pub fn server_keys(&self) -> &EcKeyPair {
        &self.server_keys
    }

    pub fn salt(&self) -> &[u8; SALT_BYTES] {
        &self.salt
    }

    /// ECDH between the server private key and a base64url peer public key.
    pub fn shared_secret(
        &self,
        peer_public_key: &str,
    ) -> Result<[u8; SHARED_SECRET_BYTES], PushError> {
        let (_, peer) = import_subscriber_key(peer_public_key)?;
        self.provider
            .derive_bits(&self.server_keys.private_key, &peer)
    }

    /// Context binding the subscriber's key (client) and ours (server).
    pub fn generate_context(&self, p256dh: &str) -> Result<Vec<u8>, PushError> {
        let (client, _) = import_subscriber_key(p256dh)?;
        self.context_for(&client)
    }

    pub fn generate_cek_info(&self, p256dh: &str) -> Result<Vec<u8>, PushError> {
        Ok(build_cek_info(&self.generate_context(p256dh)?))
    }

    pub fn generate_nonce_info(&self, p256dh: &str) -> Result<Vec<u8>, PushError> {
        Ok(build_nonce_info(&self.generate_context(p256dh)?))
    }

    /// PRK mixing the ECDH secret with the subscriber's auth secret.
    pub fn generate_prk(
        &self,
        subscriber: &SubscriberKeys,
    ) -> Result<[u8; HMAC_OUTPUT_BYTES], PushError> {
        let (_, peer) = import_subscriber_key(&subscriber.p256dh)?;
        self.prk_for(&peer, &subscriber.auth)
    }

    /// Content-encryption key and nonce for one subscriber.
    ///
    /// The subscriber key is decoded once and feeds both the ECDH and the context.
    pub fn generate_encryption_keys(
        &self,
        subscriber: &SubscriberKeys,
    ) -> Result<EncryptionKeys, PushError> {
        let (client, peer) = import_subscriber_key(&subscriber.p256dh)?;
        let mut prk = self.prk_for(&peer, &subscriber.auth)?;
        let keys = self.context_for(&client).and_then(|context| {
            derive_message_keys(self.provider.as_ref(), &prk, &self.salt, &context)
        });
        prk.zeroize();
        keys
    }

    /// Encrypt a text message for a subscriber.
    pub fn encrypt_message(
        &self,
        subscriber: &SubscriberKeys,
        plaintext: &str,
    ) -> Result<EncryptedEnvelope, PushError> {
        self.encrypt_payload(subscriber, plaintext.as_bytes())
    }

    /// Encrypt raw bytes for a subscriber. Same record format as `encrypt_message`.
    pub fn encrypt_payload(
        &self,
        subscriber: &SubscriberKeys,
        payload: &[u8],
    ) -> Result<EncryptedEnvelope, PushError> {
        tracing::trace!(payload_len = payload.len(), "encrypting push payload");
        let keys = self.generate_encryption_keys(subscriber)?;

        // No padding is ever added, so the header is always zero.
        let mut record = Vec::with_capacity(PADDING_HEADER_BYTES + payload.len());
        record.extend_from_slice(&0u16.to_be_bytes());
        record.extend_from_slice(payload);

        let cipher_text = self
            .provider
            .aes_gcm_encrypt(&keys.content_encryption_key, &keys.nonce, &record);
        record.zeroize();

        Ok(EncryptedEnvelope {
            cipher_text: cipher_text?,
            salt: base64url_encode(&self.salt),
            public_server_key: base64url_encode(&export_public_key(
                &self.server_keys.public_key,
            )?),
        })
    }
}

impl EncryptionHelper {
    fn context_for(&self, client: &[u8]) -> Result<Vec<u8>, PushError> {
        let server = export_public_key(&self.server_keys.public_key)?;
        Ok(build_context(client, &server))
    }

    fn prk_for(
        &self,
        peer: &PublicKey,
        auth: &str,
    ) -> Result<[u8; HMAC_OUTPUT_BYTES], PushError> {
        let auth = decode_auth_secret(auth)?;
        let mut shared = self
            .provider
            .derive_bits(&self.server_keys.private_key, peer)?;
        let prk = derive_prk(self.provider.as_ref(), &shared, &auth);
        shared.zeroize();
        prk
    }
}

impl std::fmt::Debug for EncryptionHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionHelper")
            .field("server_keys", &self.server_keys)
            .finish_non_exhaustive()
    }
}

/// Decode a base64url subscriber key, returning its wire bytes and the point.
fn import_subscriber_key(p256dh: &str) -> Result<(Vec<u8>, PublicKey), PushError> {
    let bytes = base64url_decode(p256dh)?;
    let key = import_public_key(&bytes)?;
    Ok((bytes, key))
}

pub(crate) fn decode_auth_secret(auth: &str) -> Result<Vec<u8>, PushError> {
    let auth = base64url_decode(auth)?;
    if auth.len() != AUTH_SECRET_BYTES {
        return Err(PushError::InvalidAuthSecretLength {
            expected: AUTH_SECRET_BYTES,
            got: auth.len(),
        });
    }
    Ok(auth)
}

pub(crate) fn derive_prk(
    provider: &dyn CryptoProvider,
    shared_secret: &[u8],
    auth_secret: &[u8],
) -> Result<[u8; HMAC_OUTPUT_BYTES], PushError> {
    let mut okm = Hkdf::new(provider, shared_secret, auth_secret)
        .generate(AUTH_INFO, HMAC_OUTPUT_BYTES)?;
    let mut prk = [0u8; HMAC_OUTPUT_BYTES];
    prk.copy_from_slice(&okm);
    okm.zeroize();
    Ok(prk)
}

/// Both expansions share the PRK and salt and differ only in info.
pub(crate) fn derive_message_keys(
    provider: &dyn CryptoProvider,
    prk: &[u8],
    salt: &[u8],
    context: &[u8],
) -> Result<EncryptionKeys, PushError> {
    let hkdf = Hkdf::new(provider, prk, salt);
    let mut cek = hkdf.generate(&build_cek_info(context), CONTENT_ENCRYPTION_KEY_BYTES)?;
    let mut nonce = hkdf.generate(&build_nonce_info(context), NONCE_BYTES)?;

    let mut keys = EncryptionKeys {
        content_encryption_key: [0u8; CONTENT_ENCRYPTION_KEY_BYTES],
        nonce: [0u8; NONCE_BYTES],
    };
    keys.content_encryption_key.copy_from_slice(&cek);
    keys.nonce.copy_from_slice(&nonce);
    cek.zeroize();
    nonce.zeroize();
    Ok(keys)
}
