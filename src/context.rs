//! HKDF info strings for the aesgcm content encoding.
//!
//! context   = "P-256" || 0x00 || len(client):2 BE || client || len(server):2 BE || server
//! cekInfo   = "Content-Encoding: aesgcm" || 0x00 || context
//! nonceInfo = "Content-Encoding: nonce" || 0x00 || context
//! authInfo  = "Content-Encoding: auth" || 0x00

const CURVE_LABEL: &[u8] = b"P-256";
const CEK_INFO_PREFIX: &[u8] = b"Content-Encoding: aesgcm\0";
const NONCE_INFO_PREFIX: &[u8] = b"Content-Encoding: nonce\0";

/// Info for deriving the PRK from the ECDH secret and the auth secret.
/// Carries no context in this version of the encoding.
pub const AUTH_INFO: &[u8] = b"Content-Encoding: auth\0";

/// Build the context binding both public keys.
///
/// Keys are expected to be validated 65-byte uncompressed points already.
pub fn build_context(client_public_key: &[u8], server_public_key: &[u8]) -> Vec<u8> {
    let mut context = Vec::with_capacity(
        CURVE_LABEL.len() + 1 + 2 + client_public_key.len() + 2 + server_public_key.len(),
    );
    context.extend_from_slice(CURVE_LABEL);
    context.push(0x00);
    context.extend_from_slice(&(client_public_key.len() as u16).to_be_bytes());
    context.extend_from_slice(client_public_key);
    context.extend_from_slice(&(server_public_key.len() as u16).to_be_bytes());
    context.extend_from_slice(server_public_key);
    context
}

pub fn build_cek_info(context: &[u8]) -> Vec<u8> {
    prefixed(CEK_INFO_PREFIX, context)
}

pub fn build_nonce_info(context: &[u8]) -> Vec<u8> {
    prefixed(NONCE_INFO_PREFIX, context)
}

fn prefixed(prefix: &[u8], context: &[u8]) -> Vec<u8> {
    let mut info = Vec::with_capacity(prefix.len() + context.len());
    info.extend_from_slice(prefix);
    info.extend_from_slice(context);
    info
}
