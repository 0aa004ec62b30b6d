//! End-to-end tests for `EncryptionHelper` against fixed keys and a known-answer vector.

use std::sync::Arc;

use p256::{PublicKey, SecretKey};
use push_encryption::{
    base64url_decode, base64url_encode, export_public_key, CryptoProvider, EcKeyPair,
    EncryptionHelper, EncryptionHelperFactory, HelperOptions, PushError, PushReceiver,
    RustCryptoProvider, ServerKeys, SubscriberKeys,
};

// ============================================================================
// Fixtures
// ============================================================================

/// Published VAPID test key pair, used as the application server keys.
const SERVER_PUBLIC_KEY: &str =
    "BG3OGHrl3YJ5PHpl0GSqtAAlUPnx1LvwQvFMIc68vhJU6nIkRzPEqtCduQz8wQj0r71NVPzr7ZRk2f-fhsQ5pK8";
const SERVER_PRIVATE_KEY: &str = "Dt1CLgQlkiaA-tmCkATyKZeoF1-Gtw1-gdEP6pOCqj4";

/// Public key for the subscriber scalar 0x11 * 32.
const SUBSCRIBER_PUBLIC_KEY: &str =
    "BAIX5hfwtkQ5KCePlpmeaaI6TywVK99tbN9m5bgCgtTtGUp968uXcS0t2jyoWqh2Wlb0X8dYWZZS8ol8ZTBuV5Q";
const SUBSCRIBER_SCALAR: [u8; 32] = [0x11; 32];
const AUTH_SECRET: [u8; 16] = [0x22; 16];

const PLAINTEXT: &str = "Hello, world!";

fn server_keys() -> ServerKeys {
    ServerKeys {
        public_key: SERVER_PUBLIC_KEY.to_string(),
        private_key: SERVER_PRIVATE_KEY.to_string(),
    }
}

fn subscriber() -> SubscriberKeys {
    SubscriberKeys {
        p256dh: SUBSCRIBER_PUBLIC_KEY.to_string(),
        auth: base64url_encode(&AUTH_SECRET),
    }
}

fn fixed_helper() -> EncryptionHelper {
    EncryptionHelperFactory::default()
        .generate_helper(&HelperOptions {
            server_keys: Some(server_keys()),
            salt: Some(base64url_encode(&[0u8; 16])),
        })
        .unwrap()
}

fn fixed_receiver() -> PushReceiver {
    let pair = EcKeyPair::from_secret(SecretKey::from_slice(&SUBSCRIBER_SCALAR).unwrap());
    PushReceiver::new(Arc::new(RustCryptoProvider), pair, AUTH_SECRET)
}

// ============================================================================
// Known-answer vector
// ============================================================================

#[test]
fn fixture_subscriber_key_matches_scalar() {
    let keys = fixed_receiver().subscriber_keys().unwrap();
    assert_eq!(keys, subscriber());
}

#[test]
fn shared_secret_vector() {
    let shared = fixed_helper().shared_secret(SUBSCRIBER_PUBLIC_KEY).unwrap();
    assert_eq!(
        hex::encode(shared),
        "39919f22a05dd0a27e225fa45436f48ce16b6484f850446fb514735fe9c451c7"
    );
}

#[test]
fn prk_vector() {
    let prk = fixed_helper().generate_prk(&subscriber()).unwrap();
    assert_eq!(
        hex::encode(prk),
        "bbe8cb0abf2d5e54507f6721560c67cf8f44cb091d28da7a3fb3d51ab038a37a"
    );
}

#[test]
fn encryption_keys_vector() {
    let keys = fixed_helper().generate_encryption_keys(&subscriber()).unwrap();
    assert_eq!(
        hex::encode(keys.content_encryption_key),
        "9f368114f1254d5876ac2728c97f2b8e"
    );
    assert_eq!(hex::encode(keys.nonce), "6b7db9c39456689c096f9d28");
}

#[test]
fn ciphertext_vector() {
    let envelope = fixed_helper().encrypt_message(&subscriber(), PLAINTEXT).unwrap();
    assert_eq!(
        hex::encode(&envelope.cipher_text),
        "da1ca0a9b4850c224b74e67d8b472cb054b65abd7bc20b053c7ed04baec34f"
    );
}

// ============================================================================
// Envelope shape
// ============================================================================

#[test]
fn fixed_scenario_envelope() {
    let envelope = fixed_helper().encrypt_message(&subscriber(), PLAINTEXT).unwrap();

    assert_eq!(base64url_decode(&envelope.salt).unwrap(), vec![0u8; 16]);
    assert_eq!(envelope.public_server_key, SERVER_PUBLIC_KEY);
    assert_eq!(
        base64url_decode(&envelope.public_server_key).unwrap().len(),
        65
    );
    assert_eq!(envelope.cipher_text.len(), 2 + PLAINTEXT.len() + 16);
}

#[test]
fn multibyte_plaintext_length_counts_utf8_bytes() {
    let text = "héllo 🔔";
    let envelope = fixed_helper().encrypt_message(&subscriber(), text).unwrap();
    assert_eq!(envelope.cipher_text.len(), 2 + text.as_bytes().len() + 16);
    assert_eq!(fixed_receiver().decrypt_message(&envelope).unwrap(), text);
}

#[test]
fn fixed_scenario_decrypts() {
    let envelope = fixed_helper().encrypt_message(&subscriber(), PLAINTEXT).unwrap();
    assert_eq!(fixed_receiver().decrypt_message(&envelope).unwrap(), PLAINTEXT);
}

#[test]
fn different_salts_produce_different_ciphertexts() {
    let factory = EncryptionHelperFactory::default();
    let options = HelperOptions {
        server_keys: Some(server_keys()),
        salt: None,
    };
    let a = factory.generate_helper(&options).unwrap();
    let b = factory.generate_helper(&options).unwrap();

    let keys_a = a.generate_encryption_keys(&subscriber()).unwrap();
    let keys_b = b.generate_encryption_keys(&subscriber()).unwrap();
    assert_ne!(keys_a.content_encryption_key, keys_b.content_encryption_key);
    assert_ne!(keys_a.nonce, keys_b.nonce);

    let env_a = a.encrypt_message(&subscriber(), PLAINTEXT).unwrap();
    let env_b = b.encrypt_message(&subscriber(), PLAINTEXT).unwrap();
    assert_ne!(env_a.cipher_text, env_b.cipher_text);
    assert_eq!(env_a.public_server_key, env_b.public_server_key);
}

#[test]
fn subscription_json_drives_encryption() {
    let json = format!(
        r#"{{"endpoint": "https://push.example.net/send/abc", "expirationTime": null,
            "keys": {{"p256dh": "{}", "auth": "{}"}}}}"#,
        SUBSCRIBER_PUBLIC_KEY,
        base64url_encode(&AUTH_SECRET)
    );
    let subscription = push_encryption::PushSubscription::from_json(&json).unwrap();
    let envelope = fixed_helper()
        .encrypt_message(&subscription.keys, PLAINTEXT)
        .unwrap();
    assert_eq!(fixed_receiver().decrypt_message(&envelope).unwrap(), PLAINTEXT);
}

// ============================================================================
// Provider failures pass through
// ============================================================================

/// Delegates to RustCrypto but refuses ECDH.
struct NoEcdhProvider;

impl CryptoProvider for NoEcdhProvider {
    fn generate_secret_key(&self) -> Result<SecretKey, PushError> {
        RustCryptoProvider.generate_secret_key()
    }

    fn derive_bits(&self, _: &SecretKey, _: &PublicKey) -> Result<[u8; 32], PushError> {
        Err(PushError::DeriveFailed("ECDH disabled".to_string()))
    }

    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> Result<[u8; 32], PushError> {
        RustCryptoProvider.hmac_sha256(key, data)
    }

    fn aes_gcm_encrypt(
        &self,
        key: &[u8],
        iv: &[u8; 12],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PushError> {
        RustCryptoProvider.aes_gcm_encrypt(key, iv, plaintext)
    }

    fn aes_gcm_decrypt(
        &self,
        key: &[u8],
        iv: &[u8; 12],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PushError> {
        RustCryptoProvider.aes_gcm_decrypt(key, iv, ciphertext)
    }

    fn fill_random(&self, dest: &mut [u8]) -> Result<(), PushError> {
        RustCryptoProvider.fill_random(dest)
    }
}

#[test]
fn provider_errors_propagate_unchanged() {
    let factory = EncryptionHelperFactory::new(Arc::new(NoEcdhProvider));
    let helper = factory.generate_helper(&HelperOptions::default()).unwrap();
    let err = helper.encrypt_message(&subscriber(), PLAINTEXT).unwrap_err();
    match err {
        PushError::DeriveFailed(msg) => assert_eq!(msg, "ECDH disabled"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn injected_provider_is_shared_with_helpers() {
    let provider: Arc<dyn CryptoProvider> = Arc::new(RustCryptoProvider);
    let factory = EncryptionHelperFactory::new(provider.clone());
    let pair = factory.generate_keys().unwrap();
    let helper = EncryptionHelper::new(provider, pair.clone(), &[0x01; 16]).unwrap();
    assert_eq!(
        export_public_key(helper.public_server_key()).unwrap(),
        export_public_key(&pair.public_key).unwrap()
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_encryption_on_shared_helper() {
    let helper = Arc::new(fixed_helper());
    let expected = helper.encrypt_message(&subscriber(), PLAINTEXT).unwrap();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let helper = Arc::clone(&helper);
        handles.push(tokio::spawn(async move {
            helper.encrypt_message(&subscriber(), PLAINTEXT).unwrap()
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), expected);
    }
}
