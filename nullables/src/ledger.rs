//! Nullable node: an in-memory JSON-RPC endpoint with one deployed contract.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::{json, Value};

use carbon_client::rpc::{data, parse_data, quantity};
use carbon_client::{RpcError, RpcTransport};
use carbon_transactions::{CarbonCreditCall, DecodedTransaction};
use carbon_types::{Address, ChainId, Credit, TxHash};

use crate::contract::{CreditBook, Revert};

/// One request as the node received it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedRequest {
    pub method: String,
    pub params: Value,
}

struct Mined {
    block_number: u64,
    success: bool,
    gas_used: u64,
    from: Address,
    to: Address,
}

struct Pending {
    sender: Address,
    tx: DecodedTransaction,
}

struct NodeState {
    chain_id: ChainId,
    contract: Address,
    book: CreditBook,
    /// Next nonce per account, counting pending transactions.
    nonces: HashMap<Address, u64>,
    pending: Vec<Pending>,
    receipts: HashMap<TxHash, Mined>,
    block_number: u64,
    automine: bool,
    offline: bool,
    requests: Vec<RecordedRequest>,
}

/// A test node that executes transactions against an in-memory contract.
///
/// With automine on (the default) every accepted transaction is mined at
/// once, and a reverting one is reported as a JSON-RPC error the way local
/// development nodes do. With automine off, transactions wait for
/// [`NullLedger::mine`] and their receipts stay `null` until then.
pub struct NullLedger {
    state: Mutex<NodeState>,
}

const REVERTED: i64 = 3;
const SERVER_ERROR: i64 = -32000;
const INVALID_PARAMS: i64 = -32602;
const METHOD_NOT_FOUND: i64 = -32601;

fn node_error(code: i64, message: impl Into<String>) -> RpcError {
    RpcError::Node {
        code,
        message: message.into(),
        data: None,
    }
}

fn revert_error(revert: Revert) -> RpcError {
    RpcError::Node {
        code: REVERTED,
        message: format!("execution reverted: {revert}"),
        data: Some(data(&revert.data())),
    }
}

fn param<'a>(params: &'a Value, index: usize) -> Result<&'a Value, RpcError> {
    params
        .get(index)
        .ok_or_else(|| node_error(INVALID_PARAMS, format!("missing value for required argument {index}")))
}

fn address_param(value: &Value) -> Result<Address, RpcError> {
    value
        .as_str()
        .and_then(|s| Address::parse(s).ok())
        .ok_or_else(|| node_error(INVALID_PARAMS, "invalid address"))
}

impl NullLedger {
    /// A node on Sepolia with the contract deployed at `contract`.
    pub fn new(contract: Address) -> Self {
        Self {
            state: Mutex::new(NodeState {
                chain_id: ChainId::SEPOLIA,
                contract,
                book: CreditBook::new(),
                nonces: HashMap::new(),
                pending: Vec::new(),
                receipts: HashMap::new(),
                block_number: 0,
                automine: true,
                offline: false,
                requests: Vec::new(),
            }),
        }
    }

    pub fn with_chain_id(self, chain_id: ChainId) -> Self {
        self.lock().chain_id = chain_id;
        self
    }

    fn lock(&self) -> MutexGuard<'_, NodeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// While offline every request fails as if the connection were refused.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn set_automine(&self, automine: bool) {
        self.lock().automine = automine;
    }

    /// Mine all pending transactions in submission order. Returns how many.
    pub fn mine(&self) -> usize {
        let mut state = self.lock();
        let pending = std::mem::take(&mut state.pending);
        let count = pending.len();
        for Pending { sender, tx } in pending {
            // reverts are visible through the receipt
            let _ = state.execute(sender, &tx);
        }
        count
    }

    /// Mint a credit directly into contract storage. Returns its id.
    pub fn seed_credit(&self, owner: Address, amount: u32, location: &str) -> Result<u16, Revert> {
        self.lock().book.mint(owner, amount, location)
    }

    /// Read contract storage directly.
    pub fn credit(&self, id: u16) -> Option<Credit> {
        self.lock().book.get(id).cloned()
    }

    pub fn next_id(&self) -> u16 {
        self.lock().book.next_id()
    }

    pub fn nonce_of(&self, account: Address) -> u64 {
        self.lock().nonces.get(&account).copied().unwrap_or(0)
    }

    /// All requests received so far (for assertions).
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.lock().requests.iter().map(|r| r.method.clone()).collect()
    }

    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    fn handle(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let mut state = self.lock();
        state.requests.push(RecordedRequest {
            method: method.to_string(),
            params: params.clone(),
        });
        if state.offline {
            return Err(RpcError::Transport("connection refused".into()));
        }

        match method {
            "eth_chainId" => Ok(json!(quantity(state.chain_id.0))),
            "eth_call" => state.eth_call(&params),
            "eth_getTransactionCount" => state.transaction_count(&params),
            "eth_sendRawTransaction" => state.send_raw_transaction(&params),
            "eth_getTransactionReceipt" => state.receipt(&params),
            other => Err(node_error(
                METHOD_NOT_FOUND,
                format!("the method {other} does not exist/is not available"),
            )),
        }
    }
}

impl RpcTransport for NullLedger {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        self.handle(method, params)
    }
}

impl NodeState {
    fn eth_call(&self, params: &Value) -> Result<Value, RpcError> {
        let call = param(params, 0)?;
        let to = address_param(call.get("to").unwrap_or(&Value::Null))?;
        let from = match call.get("from") {
            Some(value) => address_param(value)?,
            None => Address::ZERO,
        };
        let input = match call.get("data").or_else(|| call.get("input")) {
            Some(value) => parse_data(value).map_err(|e| node_error(INVALID_PARAMS, e.to_string()))?,
            None => Vec::new(),
        };

        // no code at the address: the call succeeds with empty output
        if to != self.contract {
            return Ok(json!("0x"));
        }
        let call = CarbonCreditCall::decode(&input)
            .map_err(|_| revert_error(Revert("function selector was not recognized".into())))?;
        let output = self.book.call(from, &call).map_err(revert_error)?;
        Ok(json!(data(&output)))
    }

    fn transaction_count(&self, params: &Value) -> Result<Value, RpcError> {
        let account = address_param(param(params, 0)?)?;
        let next = self.nonces.get(&account).copied().unwrap_or(0);
        let count = match params.get(1).and_then(Value::as_str) {
            Some("pending") => next,
            _ => {
                let queued = self.pending.iter().filter(|p| p.sender == account).count() as u64;
                next - queued
            }
        };
        Ok(json!(quantity(count)))
    }

    fn send_raw_transaction(&mut self, params: &Value) -> Result<Value, RpcError> {
        let raw = parse_data(param(params, 0)?).map_err(|e| node_error(INVALID_PARAMS, e.to_string()))?;
        let tx = DecodedTransaction::decode(&raw)
            .map_err(|e| node_error(SERVER_ERROR, format!("invalid transaction: {e}")))?;
        if tx.chain_id != self.chain_id {
            return Err(node_error(SERVER_ERROR, "invalid chain id for signer"));
        }
        let sender = tx
            .sender()
            .map_err(|_| node_error(SERVER_ERROR, "invalid sender"))?;
        if self.receipts.contains_key(&tx.hash) || self.pending.iter().any(|p| p.tx.hash == tx.hash) {
            return Err(node_error(SERVER_ERROR, "already known"));
        }
        if tx.gas_limit < 21_000 {
            return Err(node_error(SERVER_ERROR, "intrinsic gas too low"));
        }

        let expected = self.nonces.get(&sender).copied().unwrap_or(0);
        if tx.nonce < expected {
            return Err(node_error(
                SERVER_ERROR,
                format!("nonce too low: next nonce {expected}, tx nonce {}", tx.nonce),
            ));
        }
        if tx.nonce > expected {
            return Err(node_error(
                SERVER_ERROR,
                format!("nonce too high: next nonce {expected}, tx nonce {}", tx.nonce),
            ));
        }
        self.nonces.insert(sender, expected + 1);

        let hash = tx.hash;
        if self.automine {
            self.execute(sender, &tx).map_err(revert_error)?;
        } else {
            self.pending.push(Pending { sender, tx });
        }
        Ok(json!(hash.to_string()))
    }

    /// Mine one transaction into its own block and record the receipt.
    fn execute(&mut self, sender: Address, tx: &DecodedTransaction) -> Result<(), Revert> {
        self.block_number += 1;
        let gas_used = (21_000 + 16 * tx.data.len() as u64).min(tx.gas_limit);

        let outcome = if tx.to != self.contract {
            Ok(())
        } else if tx.value != 0 {
            Err(Revert("function is not payable".into()))
        } else {
            match CarbonCreditCall::decode(&tx.data) {
                Ok(call) => self.book.execute(sender, &call),
                Err(_) => Err(Revert("function selector was not recognized".into())),
            }
        };

        self.receipts.insert(
            tx.hash,
            Mined {
                block_number: self.block_number,
                success: outcome.is_ok(),
                gas_used,
                from: sender,
                to: tx.to,
            },
        );
        outcome
    }

    fn receipt(&self, params: &Value) -> Result<Value, RpcError> {
        let hash = param(params, 0)?
            .as_str()
            .and_then(|s| TxHash::parse(s).ok())
            .ok_or_else(|| node_error(INVALID_PARAMS, "invalid transaction hash"))?;
        Ok(match self.receipts.get(&hash) {
            None => Value::Null,
            Some(mined) => json!({
                "transactionHash": hash.to_string(),
                "blockNumber": quantity(mined.block_number),
                "from": mined.from.to_string(),
                "to": mined.to.to_string(),
                "status": quantity(u64::from(mined.success)),
                "gasUsed": quantity(mined.gas_used),
                "logs": [],
            }),
        })
    }
}
