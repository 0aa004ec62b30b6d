//! Construction of `EncryptionHelper`s from generated or imported material.

use std::sync::Arc;

use zeroize::Zeroize;

use crate::base64url::base64url_decode;
use crate::error::PushError;
use crate::helper::EncryptionHelper;
use crate::keys::EcKeyPair;
use crate::provider::{CryptoProvider, RustCryptoProvider};
use crate::types::{HelperOptions, ServerKeys, SALT_BYTES};

/// Builds encryption helpers on top of an injected `CryptoProvider`.
#[derive(Clone)]
pub struct EncryptionHelperFactory {
    provider: Arc<dyn CryptoProvider>,
}

impl Default for EncryptionHelperFactory {
    fn default() -> Self {
        Self::new(Arc::new(RustCryptoProvider))
    }
}

impl EncryptionHelperFactory {
    pub fn new(provider: Arc<dyn CryptoProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<dyn CryptoProvider> {
        &self.provider
    }

    /// Generate a fresh P-256 server key pair.
    pub fn generate_keys(&self) -> Result<EcKeyPair, PushError> {
        tracing::debug!("generating P-256 server key pair");
        Ok(EcKeyPair::from_secret(self.provider.generate_secret_key()?))
    }

    /// Generate a random 16-byte salt.
    pub fn generate_salt(&self) -> Result<[u8; SALT_BYTES], PushError> {
        let mut salt = [0u8; SALT_BYTES];
        self.provider.fill_random(&mut salt)?;
        Ok(salt)
    }

    /// Import a server key pair from its base64url wire form.
    ///
    /// Both `publicKey` and `privateKey` must be present.
    pub fn import_keys(&self, server_keys: &ServerKeys) -> Result<EcKeyPair, PushError> {
        if server_keys.public_key.is_empty() || server_keys.private_key.is_empty() {
            return Err(PushError::MissingServerKeys);
        }
        tracing::debug!("importing server key pair");
        EcKeyPair::from_wire(server_keys)
    }

    /// Build a helper, importing whatever `options` supplies and generating the rest.
    pub fn generate_helper(&self, options: &HelperOptions) -> Result<EncryptionHelper, PushError> {
        let server_keys = match &options.server_keys {
            Some(keys) => self.import_keys(keys)?,
            None => self.generate_keys()?,
        };

        let mut salt = match &options.salt {
            Some(encoded) => base64url_decode(encoded)?,
            None => self.generate_salt()?.to_vec(),
        };
        let helper = EncryptionHelper::new(self.provider.clone(), server_keys, &salt);
        salt.zeroize();
        helper
    }
}

impl std::fmt::Debug for EncryptionHelperFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionHelperFactory").finish_non_exhaustive()
    }
}
