//! Account address derivation from public keys.

use carbon_types::{Address, PublicKey};

/// Derive the account address: the last 20 bytes of `keccak256(X || Y)`.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let hash = crate::keccak256(public_key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&hash[12..]);
    Address::new(bytes)
}
