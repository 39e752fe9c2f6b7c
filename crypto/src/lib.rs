//! Cryptographic primitives for the carbon ledger client.
//!
//! - **secp256k1** ECDSA with public-key recovery for transaction signing
//! - **Keccak-256** for transaction hashes, ABI selectors and address derivation
//! - Address derivation: last 20 bytes of `keccak256(uncompressed_pubkey)`

pub mod address;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::derive_address;
pub use error::CryptoError;
pub use hash::{hash_transaction, keccak256, keccak256_multi};
pub use keys::public_from_private;
pub use sign::{recover_address, sign_prehash};
