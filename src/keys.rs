//! P-256 key import/export between wire form and `p256` key handles.
//!
//! Public keys travel as 65-byte uncompressed SEC1 points (`0x04 || x || y`),
//! private keys as 32-byte big-endian scalars.

use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::{EncodedPoint, FieldBytes, PublicKey, SecretKey};
use zeroize::Zeroize;

use crate::base64url::{base64url_decode, base64url_encode};
use crate::error::{KeyFormatError, PushError};
use crate::types::{ServerKeys, PRIVATE_KEY_BYTES, PUBLIC_KEY_BYTES, UNCOMPRESSED_POINT_TAG};

/// A P-256 key pair usable for ECDH.
#[derive(Clone)]
pub struct EcKeyPair {
    pub public_key: PublicKey,
    pub private_key: SecretKey,
}

impl EcKeyPair {
    /// Wrap a private key together with its public point.
    pub fn from_secret(private_key: SecretKey) -> Self {
        Self {
            public_key: private_key.public_key(),
            private_key,
        }
    }

    /// Import from the base64url wire form.
    pub fn from_wire(keys: &ServerKeys) -> Result<Self, PushError> {
        let mut private = base64url_decode(&keys.private_key)?;
        let public = base64url_decode(&keys.public_key);
        let pair = public.and_then(|public| import_key_pair(&public, &private));
        private.zeroize();
        pair
    }

    /// Export to the base64url wire form.
    pub fn to_wire(&self) -> Result<ServerKeys, PushError> {
        let mut private = export_private_key(&self.private_key);
        let wire = ServerKeys {
            public_key: base64url_encode(&export_public_key(&self.public_key)?),
            private_key: base64url_encode(&private),
        };
        private.zeroize();
        Ok(wire)
    }
}

impl std::fmt::Debug for EcKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EcKeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Check the wire-level shape of a public key: 65 bytes starting with `0x04`.
pub fn validate_public_key_bytes(bytes: &[u8]) -> Result<(), KeyFormatError> {
    if bytes.len() != PUBLIC_KEY_BYTES {
        return Err(KeyFormatError::PublicKeyLength {
            expected: PUBLIC_KEY_BYTES,
            got: bytes.len(),
        });
    }
    if bytes[0] != UNCOMPRESSED_POINT_TAG {
        return Err(KeyFormatError::PublicKeyPrefix(bytes[0]));
    }
    Ok(())
}

/// Import a public key from its 65-byte uncompressed form.
///
/// Points that pass the shape check but are not on P-256 fail with `ImportFailed`.
pub fn import_public_key(bytes: &[u8]) -> Result<PublicKey, PushError> {
    validate_public_key_bytes(bytes)?;

    let x = FieldBytes::from_slice(&bytes[1..33]);
    let y = FieldBytes::from_slice(&bytes[33..65]);
    let point = EncodedPoint::from_affine_coordinates(x, y, false);

    PublicKey::from_encoded_point(&point)
        .into_option()
        .ok_or_else(|| PushError::ImportFailed("EC point not on P-256 curve".to_string()))
}

/// Import a public key from its base64url string form.
pub fn import_public_key_base64url(encoded: &str) -> Result<PublicKey, PushError> {
    import_public_key(&base64url_decode(encoded)?)
}

/// Import a private key from its 32-byte scalar.
pub fn import_private_key(bytes: &[u8]) -> Result<SecretKey, PushError> {
    if bytes.len() != PRIVATE_KEY_BYTES {
        return Err(KeyFormatError::PrivateKeyLength {
            expected: PRIVATE_KEY_BYTES,
            got: bytes.len(),
        }
        .into());
    }
    SecretKey::from_slice(bytes)
        .map_err(|e| PushError::ImportFailed(format!("invalid private key scalar: {}", e)))
}

/// Import a key pair. The public key must be the one belonging to the scalar.
pub fn import_key_pair(public: &[u8], private: &[u8]) -> Result<EcKeyPair, PushError> {
    let public_key = import_public_key(public)?;
    let private_key = import_private_key(private)?;
    if private_key.public_key() != public_key {
        return Err(PushError::ImportFailed(
            "public key does not match private key".to_string(),
        ));
    }
    Ok(EcKeyPair {
        public_key,
        private_key,
    })
}

/// Export a public key as `0x04 || x || y`.
pub fn export_public_key(key: &PublicKey) -> Result<[u8; PUBLIC_KEY_BYTES], PushError> {
    let point = key.to_encoded_point(false);
    point
        .as_bytes()
        .try_into()
        .map_err(|_| PushError::ImportFailed("unexpected encoded point length".to_string()))
}

/// Export a private key as its raw 32-byte scalar. Callers should zeroize the result.
pub fn export_private_key(key: &SecretKey) -> [u8; PRIVATE_KEY_BYTES] {
    key.to_bytes().into()
}
