//! The ledger client: contract reads and signed contract writes.

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use carbon_transactions::{
    decode_credit, decode_location, decode_next_id, CarbonCreditCall, TransactionRequest,
};
use carbon_types::{Address, ChainId, Credit, CreditId, TxHash};

use crate::config::{explorer_tx_url, ClientConfig, GasConfig};
use crate::error::ClientError;
use crate::receipt::TransactionReceipt;
use crate::rpc::{self, HttpTransport, RpcTransport};
use crate::session::OperatorSession;

/// Client for one deployed carbon credit contract.
///
/// Holds no ledger state: every read goes to the node and every write is
/// built from scratch with a freshly fetched nonce and chain id.
pub struct LedgerClient<T> {
    transport: T,
    contract: Address,
    gas: GasConfig,
    explorer_url: String,
}

impl LedgerClient<HttpTransport> {
    /// Build an HTTP-backed client from validated configuration.
    pub fn connect(config: &ClientConfig) -> Result<Self, ClientError> {
        let (url, contract) = config.endpoint()?;
        let transport = HttpTransport::new(url, config.request_timeout(), config.connect_timeout())
            .map_err(|e| ClientError::Configuration(e.to_string()))?;
        Ok(Self::new(transport, contract)
            .with_gas(config.gas.clone())
            .with_explorer_url(config.explorer_url.clone()))
    }
}

impl<T: RpcTransport> LedgerClient<T> {
    pub fn new(transport: T, contract: Address) -> Self {
        let defaults = ClientConfig::default();
        Self {
            transport,
            contract,
            gas: defaults.gas,
            explorer_url: defaults.explorer_url,
        }
    }

    pub fn with_gas(mut self, gas: GasConfig) -> Self {
        self.gas = gas;
        self
    }

    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = url.into();
        self
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Explorer page for a submitted transaction.
    pub fn explorer_link(&self, hash: &TxHash) -> String {
        explorer_tx_url(&self.explorer_url, hash)
    }

    // ── Reads ──────────────────────────────────────────────────────────

    async fn call(&self, call: &CarbonCreditCall) -> Result<Vec<u8>, ClientError> {
        debug!(function = call.name(), "eth_call");
        let params = json!([
            {"to": self.contract.to_string(), "data": rpc::data(&call.encode())},
            "latest"
        ]);
        let result = self
            .transport
            .request("eth_call", params)
            .await
            .map_err(ClientError::read)?;
        rpc::parse_data(&result).map_err(ClientError::read)
    }

    /// Number of credits issued so far (the contract's `nextId`).
    pub async fn total_issued(&self) -> Result<u16, ClientError> {
        let data = self.call(&CarbonCreditCall::NextId).await?;
        decode_next_id(&data).map_err(ClientError::undecodable)
    }

    /// Fetch one credit record. A record for a different id means the slot
    /// is unset and is reported as not found.
    pub async fn credit(&self, id: CreditId) -> Result<Credit, ClientError> {
        let data = self.call(&CarbonCreditCall::Credits { id }).await?;
        let credit = decode_credit(&data).map_err(ClientError::undecodable)?;
        if credit.id != id.get() {
            return Err(ClientError::RemoteRead(format!("credit {id} not found")));
        }
        Ok(credit)
    }

    pub async fn credit_location(&self, id: CreditId) -> Result<String, ClientError> {
        let data = self.call(&CarbonCreditCall::GetCreditLocation { id }).await?;
        decode_location(&data).map_err(ClientError::undecodable)
    }

    /// Look up a submitted transaction. `None` while it is still pending.
    pub async fn transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> Result<Option<TransactionReceipt>, ClientError> {
        let result = self
            .transport
            .request("eth_getTransactionReceipt", json!([hash.to_string()]))
            .await
            .map_err(ClientError::read)?;
        TransactionReceipt::from_json(&result).map_err(ClientError::read)
    }

    // ── Writes ─────────────────────────────────────────────────────────

    pub async fn issue_credit(
        &self,
        session: &OperatorSession,
        to: Address,
        amount: u32,
        location: &str,
    ) -> Result<TxHash, ClientError> {
        require_positive(amount)?;
        let call = CarbonCreditCall::IssueCredit {
            to,
            amount,
            location: location.to_string(),
        };
        self.submit(session, call).await
    }

    /// Ownership is checked by the contract, not here.
    pub async fn transfer_credit(
        &self,
        session: &OperatorSession,
        id: CreditId,
        to: Address,
        amount: u32,
    ) -> Result<TxHash, ClientError> {
        require_positive(amount)?;
        self.submit(session, CarbonCreditCall::TransferCredit { id, to, amount })
            .await
    }

    /// Submitted even if the credit is already retired; the contract decides.
    pub async fn retire_credit(
        &self,
        session: &OperatorSession,
        id: CreditId,
    ) -> Result<TxHash, ClientError> {
        self.submit(session, CarbonCreditCall::RetireCredit { id }).await
    }

    pub async fn update_credit_location(
        &self,
        session: &OperatorSession,
        id: CreditId,
        new_location: &str,
    ) -> Result<TxHash, ClientError> {
        let call = CarbonCreditCall::UpdateCreditLocation {
            id,
            new_location: new_location.to_string(),
        };
        self.submit(session, call).await
    }

    async fn write_request(&self, method: &str, params: Value) -> Result<Value, ClientError> {
        self.transport
            .request(method, params)
            .await
            .map_err(ClientError::write)
    }

    async fn chain_id(&self) -> Result<ChainId, ClientError> {
        let result = self.write_request("eth_chainId", json!([])).await?;
        rpc::parse_quantity(&result)
            .map(ChainId)
            .map_err(ClientError::write)
    }

    async fn pending_nonce(&self, account: Address) -> Result<u64, ClientError> {
        let result = self
            .write_request(
                "eth_getTransactionCount",
                json!([account.to_string(), "pending"]),
            )
            .await?;
        rpc::parse_quantity(&result).map_err(ClientError::write)
    }

    /// Build, sign and send one contract write. Never retried.
    async fn submit(
        &self,
        session: &OperatorSession,
        call: CarbonCreditCall,
    ) -> Result<TxHash, ClientError> {
        let function = call.name();
        let from = session.address();

        let chain_id = self.chain_id().await?;
        let nonce = self.pending_nonce(from).await?;
        let request = TransactionRequest {
            from,
            nonce,
            gas_price: self.gas.gas_price_wei(),
            gas_limit: self.gas.limit_for(&call),
            to: self.contract,
            value: 0,
            data: call.encode(),
            chain_id,
        };
        let signed = session.sign(request)?;
        let hash = signed.hash();

        let returned = match self
            .write_request("eth_sendRawTransaction", json!([signed.raw_hex()]))
            .await
        {
            Ok(value) => value,
            Err(err) => {
                warn!(function, %from, nonce, error = %err, "transaction rejected");
                return Err(err);
            }
        };
        match returned.as_str().map(TxHash::parse) {
            Some(Ok(node_hash)) if node_hash == hash => {}
            _ => warn!(function, %hash, reported = %returned, "node reported a different transaction hash"),
        }

        info!(function, %from, nonce, %chain_id, %hash, "transaction submitted");
        Ok(hash)
    }
}

fn require_positive(amount: u32) -> Result<(), ClientError> {
    if amount == 0 {
        return Err(ClientError::Input("amount must be at least 1 ton".into()));
    }
    Ok(())
}
