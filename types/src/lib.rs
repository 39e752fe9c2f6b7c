//! Fundamental types for the carbon credit ledger client.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: account addresses, transaction hashes, key material, chain ids,
//! and the credit record returned by the remote contract.

pub mod address;
pub mod credit;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;

pub use address::Address;
pub use credit::{Credit, CreditId};
pub use error::TypesError;
pub use hash::TxHash;
pub use keys::{PrivateKey, PublicKey, Signature};
pub use network::ChainId;
