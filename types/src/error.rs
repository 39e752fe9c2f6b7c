//! Parse and validation errors for the shared value types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("address checksum mismatch: {0}")]
    ChecksumMismatch(String),

    #[error("invalid transaction hash: {0}")]
    InvalidHash(String),

    #[error("invalid credit id: {0}")]
    InvalidCreditId(String),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
}
