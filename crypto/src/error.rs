use thiserror::Error;

/// Errors arising from key handling and signing.
///
/// Variants never carry key bytes.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("private key is not a valid secp256k1 scalar")]
    InvalidPrivateKey,

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("public key recovery failed")]
    Recovery,
}
