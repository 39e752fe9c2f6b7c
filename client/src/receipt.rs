//! Receipts for submitted transactions.

use serde::Serialize;
use serde_json::Value;

use carbon_types::TxHash;

use crate::rpc::{parse_quantity, RpcError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// The mined outcome of a transaction, as reported by `eth_getTransactionReceipt`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionReceipt {
    pub transaction_hash: TxHash,
    pub block_number: u64,
    pub status: ReceiptStatus,
    pub gas_used: u64,
}

impl TransactionReceipt {
    /// Parse a receipt object. `null` (still pending) yields `None`.
    pub fn from_json(value: &Value) -> Result<Option<Self>, RpcError> {
        if value.is_null() {
            return Ok(None);
        }
        let field = |name: &str| {
            value
                .get(name)
                .ok_or_else(|| RpcError::InvalidResponse(format!("receipt missing {name}")))
        };

        let hash_text = field("transactionHash")?
            .as_str()
            .ok_or_else(|| RpcError::InvalidResponse("transactionHash is not a string".into()))?;
        let transaction_hash = TxHash::parse(hash_text)
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;

        let status = match parse_quantity(field("status")?)? {
            1 => ReceiptStatus::Success,
            0 => ReceiptStatus::Reverted,
            other => {
                return Err(RpcError::InvalidResponse(format!(
                    "unexpected receipt status {other}"
                )))
            }
        };

        Ok(Some(Self {
            transaction_hash,
            block_number: parse_quantity(field("blockNumber")?)?,
            status,
            gas_used: parse_quantity(field("gasUsed")?)?,
        }))
    }

    pub fn succeeded(&self) -> bool {
        self.status == ReceiptStatus::Success
    }
}
