//! Client configuration with TOML file support.

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use carbon_transactions::CarbonCreditCall;
use carbon_types::{Address, TxHash};
use carbon_utils::{gwei_to_wei, LogFormat};

use crate::error::ClientError;

/// Configuration for the ledger client and its operator surfaces.
///
/// Loaded from TOML via [`ClientConfig::from_toml_file`]; the binary then
/// overlays command-line flags and environment variables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// JSON-RPC endpoint of an Ethereum node.
    #[serde(default)]
    pub rpc_url: Option<String>,

    /// Address of the deployed carbon credit contract.
    #[serde(default)]
    pub contract_address: Option<Address>,

    /// Block explorer base URL; transactions link to `{explorer_url}/tx/{hash}`.
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Address the dashboard listens on.
    #[serde(default = "default_dashboard_bind")]
    pub dashboard_bind: SocketAddr,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Must stay the last field: TOML tables follow plain values.
    #[serde(default)]
    pub gas: GasConfig,
}

/// Fixed gas parameters per contract function.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GasConfig {
    #[serde(default = "default_heavy_limit")]
    pub issue_limit: u64,
    #[serde(default = "default_heavy_limit")]
    pub transfer_limit: u64,
    #[serde(default = "default_light_limit")]
    pub retire_limit: u64,
    #[serde(default = "default_light_limit")]
    pub location_limit: u64,
    #[serde(default = "default_gas_price_gwei")]
    pub gas_price_gwei: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_explorer_url() -> String {
    "https://sepolia.etherscan.io".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_dashboard_bind() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8501))
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_heavy_limit() -> u64 {
    300_000
}

fn default_light_limit() -> u64 {
    200_000
}

fn default_gas_price_gwei() -> u64 {
    5
}

// ── Impl ───────────────────────────────────────────────────────────────

impl GasConfig {
    /// Gas limit for a write call. Reads are never sent as transactions.
    pub fn limit_for(&self, call: &CarbonCreditCall) -> u64 {
        match call {
            CarbonCreditCall::IssueCredit { .. } => self.issue_limit,
            CarbonCreditCall::TransferCredit { .. } => self.transfer_limit,
            CarbonCreditCall::RetireCredit { .. } => self.retire_limit,
            CarbonCreditCall::UpdateCreditLocation { .. } => self.location_limit,
            _ => 0,
        }
    }

    pub fn gas_price_wei(&self) -> u128 {
        gwei_to_wei(self.gas_price_gwei)
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            issue_limit: default_heavy_limit(),
            transfer_limit: default_heavy_limit(),
            retire_limit: default_light_limit(),
            location_limit: default_light_limit(),
            gas_price_gwei: default_gas_price_gwei(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ClientError> {
        toml::from_str(s).map_err(|e| ClientError::Configuration(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ClientError> {
        toml::to_string_pretty(self).map_err(|e| ClientError::Configuration(e.to_string()))
    }

    /// The endpoint URL and contract address, or a configuration error naming
    /// whichever is missing or malformed.
    pub fn endpoint(&self) -> Result<(&str, Address), ClientError> {
        let url = self
            .rpc_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ClientError::Configuration("no RPC endpoint URL configured".into()))?;
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| ClientError::Configuration(format!("RPC endpoint URL is invalid: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "RPC endpoint must be http or https, got {}",
                parsed.scheme()
            )));
        }
        let contract = self
            .contract_address
            .ok_or_else(|| ClientError::Configuration("no contract address configured".into()))?;
        Ok((url, contract))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Explorer page for a transaction.
    pub fn explorer_tx_url(&self, hash: &TxHash) -> String {
        explorer_tx_url(&self.explorer_url, hash)
    }
}

pub(crate) fn explorer_tx_url(base: &str, hash: &TxHash) -> String {
    format!("{}/tx/{hash}", base.trim_end_matches('/'))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            rpc_url: None,
            contract_address: None,
            explorer_url: default_explorer_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            dashboard_bind: default_dashboard_bind(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            gas: GasConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbon_types::CreditId;

    const CONTRACT: &str = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";

    #[test]
    fn default_config_round_trips_through_toml() {
        let mut config = ClientConfig::default();
        config.contract_address = Some(Address::parse(CONTRACT).unwrap());
        let toml_str = config.to_toml_string().unwrap();
        let parsed = ClientConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.contract_address, config.contract_address);
        assert_eq!(parsed.gas, config.gas);
        assert_eq!(parsed.dashboard_bind, config.dashboard_bind);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = ClientConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.explorer_url, "https://sepolia.etherscan.io");
        assert_eq!(config.gas.issue_limit, 300_000);
        assert_eq!(config.gas.retire_limit, 200_000);
        assert_eq!(config.gas.gas_price_wei(), 5_000_000_000);
        assert_eq!(config.dashboard_bind.port(), 8501);
        assert_eq!(config.log_format, LogFormat::Human);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            rpc_url = "https://rpc.sepolia.org"
            contract_address = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"
            log_format = "json"

            [gas]
            gas_price_gwei = 12
        "#;
        let config = ClientConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.gas.gas_price_gwei, 12);
        assert_eq!(config.gas.transfer_limit, 300_000);
        assert_eq!(config.log_format, LogFormat::Json);
        let (url, contract) = config.endpoint().unwrap();
        assert_eq!(url, "https://rpc.sepolia.org");
        assert_eq!(contract.to_string(), CONTRACT);
    }

    #[test]
    fn bad_checksum_in_file_is_config_error() {
        let toml = r#"contract_address = "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAeD""#;
        assert!(matches!(
            ClientConfig::from_toml_str(toml),
            Err(ClientError::Configuration(_))
        ));
    }

    #[test]
    fn missing_endpoint_is_config_error() {
        let config = ClientConfig::default();
        let err = config.endpoint().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref m) if m.contains("RPC")));
    }

    #[test]
    fn missing_contract_is_config_error() {
        let config = ClientConfig {
            rpc_url: Some("http://localhost:8545".into()),
            ..ClientConfig::default()
        };
        let err = config.endpoint().unwrap_err();
        assert!(matches!(err, ClientError::Configuration(ref m) if m.contains("contract")));
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let config = ClientConfig {
            rpc_url: Some("ws://localhost:8546".into()),
            contract_address: Some(Address::parse(CONTRACT).unwrap()),
            ..ClientConfig::default()
        };
        assert!(matches!(config.endpoint(), Err(ClientError::Configuration(_))));
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = ClientConfig::from_toml_file("/nonexistent/carbon.toml");
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("carbon.toml");
        std::fs::write(&path, "explorer_url = \"https://etherscan.io/\"\n").unwrap();
        let config = ClientConfig::from_toml_file(&path).unwrap();
        let hash = TxHash::new([0xab; 32]);
        assert_eq!(
            config.explorer_tx_url(&hash),
            format!("https://etherscan.io/tx/0x{}", "ab".repeat(32))
        );
    }

    #[test]
    fn gas_limits_per_call() {
        let gas = GasConfig::default();
        let id = CreditId::new(1).unwrap();
        assert_eq!(gas.limit_for(&CarbonCreditCall::RetireCredit { id }), 200_000);
        assert_eq!(
            gas.limit_for(&CarbonCreditCall::TransferCredit {
                id,
                to: Address::ZERO,
                amount: 1
            }),
            300_000
        );
    }
}
