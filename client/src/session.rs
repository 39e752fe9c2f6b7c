//! The operator's signing identity for one interactive session.

use std::fmt;

use carbon_crypto::{derive_address, public_from_private};
use carbon_transactions::{SignedTransaction, TransactionRequest};
use carbon_types::{Address, PrivateKey};

use crate::error::ClientError;

/// A private key held in memory for the lifetime of a session.
///
/// Never serialised or persisted. The key is zeroized when the session is
/// dropped and `Debug` shows only the address.
pub struct OperatorSession {
    key: PrivateKey,
    address: Address,
}

impl OperatorSession {
    pub fn new(key: PrivateKey) -> Result<Self, ClientError> {
        let public = public_from_private(&key)
            .map_err(|_| ClientError::Input("private key is not a valid secp256k1 scalar".into()))?;
        let address = derive_address(&public);
        Ok(Self { key, address })
    }

    /// Parse a hex private key, with or without `0x`.
    pub fn from_hex(text: &str) -> Result<Self, ClientError> {
        Self::new(PrivateKey::from_hex(text)?)
    }

    /// The account this session signs for ("connected as").
    pub fn address(&self) -> Address {
        self.address
    }

    pub(crate) fn sign(&self, request: TransactionRequest) -> Result<SignedTransaction, ClientError> {
        request.sign(&self.key).map_err(ClientError::signing)
    }
}

impl fmt::Debug for OperatorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorSession")
            .field("address", &self.address)
            .field("key", &"<redacted>")
            .finish()
    }
}
