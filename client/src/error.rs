use thiserror::Error;

use carbon_crypto::CryptoError;
use carbon_transactions::AbiError;
use carbon_types::TypesError;

use crate::rpc::RpcError;

/// Every failure an operator can see, in four categories.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Missing endpoint or contract address, unreadable config file.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Operator input rejected before anything is sent.
    #[error("invalid input: {0}")]
    Input(String),

    /// A read-only call failed, reverted or returned undecodable data.
    #[error("read failed: {0}")]
    RemoteRead(String),

    /// A write could not be signed, submitted or was rejected by the node.
    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl ClientError {
    /// Short label for the category, used in rendered messages.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Input(_) => "input",
            Self::RemoteRead(_) => "read",
            Self::Transaction(_) => "transaction",
        }
    }

    pub(crate) fn read(err: RpcError) -> Self {
        Self::RemoteRead(err.to_string())
    }

    pub(crate) fn undecodable(err: AbiError) -> Self {
        Self::RemoteRead(format!("undecodable return data: {err}"))
    }

    pub(crate) fn write(err: RpcError) -> Self {
        Self::Transaction(err.to_string())
    }

    pub(crate) fn signing(err: CryptoError) -> Self {
        Self::Transaction(format!("signing failed: {err}"))
    }
}

impl From<TypesError> for ClientError {
    fn from(err: TypesError) -> Self {
        Self::Input(err.to_string())
    }
}
