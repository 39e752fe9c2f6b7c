//! Recoverable ECDSA signing over 32-byte prehashes.

use carbon_types::{Address, PrivateKey, Signature};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};

use crate::address::derive_address;
use crate::error::CryptoError;
use crate::keys::{public_from_verifying, signing_key};

/// Sign a 32-byte message hash with RFC 6979 nonces.
///
/// The signature is low-S normalized and the recovery id adjusted to match.
pub fn sign_prehash(prehash: &[u8; 32], private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let signing_key = signing_key(private_key)?;
    let (sig, recovery_id) = signing_key
        .sign_prehash_recoverable(prehash)
        .map_err(|e| CryptoError::Signing(e.to_string()))?;

    let bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&bytes[..32]);
    s.copy_from_slice(&bytes[32..]);

    Ok(Signature {
        r,
        s,
        recovery_id: recovery_id.to_byte(),
    })
}

fn to_ecdsa(signature: &Signature) -> Result<EcdsaSignature, CryptoError> {
    EcdsaSignature::from_slice(&signature.to_bytes())
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}

/// Recover the signer's address from a prehash and its signature.
pub fn recover_address(prehash: &[u8; 32], signature: &Signature) -> Result<Address, CryptoError> {
    let sig = to_ecdsa(signature)?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id).ok_or_else(|| {
        CryptoError::InvalidSignature(format!("recovery id {} out of range", signature.recovery_id))
    })?;
    let verifying_key = VerifyingKey::recover_from_prehash(prehash, &sig, recovery_id)
        .map_err(|_| CryptoError::Recovery)?;
    Ok(derive_address(&public_from_verifying(&verifying_key)))
}
