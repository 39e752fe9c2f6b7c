//! Key material for transaction signing.

use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::TypesError;

/// A 64-byte uncompressed secp256k1 public key (X || Y, no `0x04` tag).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 64]);

/// A 32-byte secp256k1 private key (secret scalar).
///
/// This type intentionally does not implement `Debug`, `Serialize`, or `Clone`
/// to prevent accidental exposure. Key bytes are zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub [u8; 32]);

/// A recoverable ECDSA signature.
///
/// `recovery_id` is the raw parity bit (0 or 1); chain-specific `v`
/// encodings are applied by the transaction layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl PrivateKey {
    /// Parse 64 hex digits, with or without a `0x` prefix.
    ///
    /// Error messages describe the shape of the input only, never its content.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if digits.len() != 64 {
            return Err(TypesError::InvalidPrivateKey(format!(
                "expected 64 hex digits, got {}",
                digits.len()
            )));
        }
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(digits, bytes.as_mut())
            .map_err(|_| TypesError::InvalidPrivateKey("not valid hex".into()))?;
        Ok(Self(*bytes))
    }
}

impl Signature {
    /// `r || s` as 64 bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }
}
