//! Cryptographic primitives consumed by the key schedule.
//!
//! `CryptoProvider` is the seam between the protocol logic and the primitives
//! it needs: P-256 key generation and ECDH, HMAC-SHA256, AES-128-GCM, and a
//! secure RNG. `RustCryptoProvider` implements it on the RustCrypto crates.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes128Gcm, Nonce};
use hmac::{Hmac, Mac};
use p256::{PublicKey, SecretKey};
use sha2::Sha256;

use crate::error::PushError;
use crate::types::{CONTENT_ENCRYPTION_KEY_BYTES, HMAC_OUTPUT_BYTES, NONCE_BYTES, SHARED_SECRET_BYTES};

type HmacSha256 = Hmac<Sha256>;

/// Primitive operations the encryption pipeline delegates to.
///
/// Implementations must be usable from several threads at once; none of the
/// methods take `&mut self`.
pub trait CryptoProvider: Send + Sync {
    /// Generate a fresh P-256 private key.
    fn generate_secret_key(&self) -> Result<SecretKey, PushError>;

    /// Raw ECDH: the x-coordinate of `private_key * peer`.
    fn derive_bits(
        &self,
        private_key: &SecretKey,
        peer: &PublicKey,
    ) -> Result<[u8; SHARED_SECRET_BYTES], PushError>;

    /// HMAC-SHA256 of `data` under `key`.
    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> Result<[u8; HMAC_OUTPUT_BYTES], PushError>;

    /// AES-GCM with a 128-bit tag. Returns `ciphertext || tag`.
    fn aes_gcm_encrypt(
        &self,
        key: &[u8],
        iv: &[u8; NONCE_BYTES],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PushError>;

    /// Inverse of `aes_gcm_encrypt`. Fails if the tag does not verify.
    fn aes_gcm_decrypt(
        &self,
        key: &[u8],
        iv: &[u8; NONCE_BYTES],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PushError>;

    /// Fill `dest` with cryptographically secure random bytes.
    fn fill_random(&self, dest: &mut [u8]) -> Result<(), PushError>;
}

/// `CryptoProvider` backed by `p256`, `hmac`/`sha2`, `aes-gcm` and `getrandom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustCryptoProvider;

impl RustCryptoProvider {
    fn aes128(key: &[u8]) -> Result<Aes128Gcm, PushError> {
        if key.len() != CONTENT_ENCRYPTION_KEY_BYTES {
            return Err(PushError::ImportFailed(format!(
                "AES-128 key must be {} bytes, got {}",
                CONTENT_ENCRYPTION_KEY_BYTES,
                key.len()
            )));
        }
        <Aes128Gcm as KeyInit>::new_from_slice(key)
            .map_err(|e| PushError::ImportFailed(e.to_string()))
    }
}

impl CryptoProvider for RustCryptoProvider {
    fn generate_secret_key(&self) -> Result<SecretKey, PushError> {
        Ok(SecretKey::random(&mut p256::elliptic_curve::rand_core::OsRng))
    }

    fn derive_bits(
        &self,
        private_key: &SecretKey,
        peer: &PublicKey,
    ) -> Result<[u8; SHARED_SECRET_BYTES], PushError> {
        let shared = p256::ecdh::diffie_hellman(private_key.to_nonzero_scalar(), peer.as_affine());
        let mut out = [0u8; SHARED_SECRET_BYTES];
        out.copy_from_slice(shared.raw_secret_bytes().as_slice());
        Ok(out)
    }

    fn hmac_sha256(&self, key: &[u8], data: &[u8]) -> Result<[u8; HMAC_OUTPUT_BYTES], PushError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(key)
            .map_err(|e| PushError::HmacFailed(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }

    fn aes_gcm_encrypt(
        &self,
        key: &[u8],
        iv: &[u8; NONCE_BYTES],
        plaintext: &[u8],
    ) -> Result<Vec<u8>, PushError> {
        Self::aes128(key)?
            .encrypt(Nonce::from_slice(iv), plaintext)
            .map_err(|e| PushError::EncryptionFailed(e.to_string()))
    }

    fn aes_gcm_decrypt(
        &self,
        key: &[u8],
        iv: &[u8; NONCE_BYTES],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, PushError> {
        Self::aes128(key)?
            .decrypt(Nonce::from_slice(iv), ciphertext)
            .map_err(|e| PushError::DecryptionFailed(e.to_string()))
    }

    fn fill_random(&self, dest: &mut [u8]) -> Result<(), PushError> {
        getrandom::getrandom(dest).map_err(|e| PushError::RngFailed(e.to_string()))
    }
}
