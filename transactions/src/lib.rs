//! Wire formats for talking to the carbon credit contract.
//!
//! - **abi**: Solidity ABI encoding of call data and strict decoding of return data
//! - **contract**: the fixed function set of the carbon credit contract
//! - **rlp**: recursive length prefix codec
//! - **legacy**: EIP-155 legacy transactions (build, sign, decode)

pub mod abi;
pub mod contract;
pub mod error;
pub mod legacy;
pub mod rlp;

pub use abi::{selector, Decoder, Token};
pub use contract::{decode_credit, decode_location, decode_next_id, CarbonCreditCall};
pub use error::{AbiError, DecodeError, RlpError};
pub use legacy::{DecodedTransaction, SignedTransaction, TransactionRequest};
