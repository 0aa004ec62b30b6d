//! Single-block HKDF (RFC 5869) over the provider's HMAC-SHA256.
//!
//! The aesgcm key schedule never asks for more than one HMAC block, so
//! `expand` only computes `T(1)` and rejects longer requests.

use zeroize::Zeroize;

use crate::error::PushError;
use crate::provider::CryptoProvider;
use crate::types::HMAC_OUTPUT_BYTES;

/// HKDF bound to an input secret and a salt.
pub struct Hkdf<'a> {
    provider: &'a dyn CryptoProvider,
    secret: &'a [u8],
    salt: &'a [u8],
}

impl<'a> Hkdf<'a> {
    /// # Arguments
    /// * `provider` - Supplies HMAC-SHA256
    /// * `secret` - Input keying material
    /// * `salt` - HKDF salt (the HMAC key for the extract step)
    pub fn new(provider: &'a dyn CryptoProvider, secret: &'a [u8], salt: &'a [u8]) -> Self {
        Self {
            provider,
            secret,
            salt,
        }
    }

    /// PRK = HMAC(salt, secret)
    pub fn extract(&self) -> Result<[u8; HMAC_OUTPUT_BYTES], PushError> {
        self.provider.hmac_sha256(self.salt, self.secret)
    }

    /// OKM = HMAC(prk, info || 0x01), truncated to `length` bytes.
    pub fn expand(&self, prk: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>, PushError> {
        if length > HMAC_OUTPUT_BYTES {
            return Err(PushError::ExpandLength {
                requested: length,
                max: HMAC_OUTPUT_BYTES,
            });
        }

        let mut input = Vec::with_capacity(info.len() + 1);
        input.extend_from_slice(info);
        input.push(0x01);

        let mut block = self.provider.hmac_sha256(prk, &input)?;
        let okm = block[..length].to_vec();
        block.zeroize();
        Ok(okm)
    }

    /// Extract, then expand.
    pub fn generate(&self, info: &[u8], length: usize) -> Result<Vec<u8>, PushError> {
        let mut prk = self.extract()?;
        let okm = self.expand(&prk, info, length);
        prk.zeroize();
        okm
    }
}
