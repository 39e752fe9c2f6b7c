//! secp256k1 key handling.

use carbon_types::{PrivateKey, PublicKey};
use k256::ecdsa::{SigningKey, VerifyingKey};

use crate::error::CryptoError;

/// Load a private key into a k256 signing key.
///
/// Fails when the bytes are zero or not below the curve order.
pub(crate) fn signing_key(private: &PrivateKey) -> Result<SigningKey, CryptoError> {
    SigningKey::from_slice(&private.0).map_err(|_| CryptoError::InvalidPrivateKey)
}

/// Strip the SEC1 `0x04` tag from an uncompressed point.
pub(crate) fn public_from_verifying(verifying_key: &VerifyingKey) -> PublicKey {
    let point = verifying_key.to_encoded_point(false);
    let mut out = [0u8; 64];
    out.copy_from_slice(&point.as_bytes()[1..]);
    PublicKey(out)
}

/// Derive the public key from a private key.
pub fn public_from_private(private: &PrivateKey) -> Result<PublicKey, CryptoError> {
    let signing_key = signing_key(private)?;
    Ok(public_from_verifying(signing_key.verifying_key()))
}
