//! Keccak-256 hashing for transactions, selectors and addresses.

use carbon_types::TxHash;
use sha3::{Digest, Keccak256};

/// Compute the Keccak-256 hash of arbitrary data.
///
/// This is the pre-standard Keccak padding used by Ethereum, not SHA3-256.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn keccak256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Hash a raw signed transaction to produce its `TxHash`.
pub fn hash_transaction(raw_tx: &[u8]) -> TxHash {
    TxHash::new(keccak256(raw_tx))
}
