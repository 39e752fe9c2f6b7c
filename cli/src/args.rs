//! Command-line arguments and their overlay onto the TOML configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use zeroize::Zeroizing;

use carbon_client::ClientConfig;
use carbon_types::{Address, CreditId, TxHash};
use carbon_utils::LogFormat;

/// Environment variable holding the operator private key as hex. Deliberately
/// has no flag counterpart.
pub const PRIVATE_KEY_ENV: &str = "CARBON_PRIVATE_KEY";

#[derive(Parser)]
#[command(
    name = "carbon-ledger",
    version,
    about = "Issue, transfer, retire and locate carbon credits on an Ethereum ledger"
)]
pub struct Cli {
    /// JSON-RPC endpoint of the Ethereum node.
    #[arg(long, env = "CARBON_RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Address of the deployed carbon credit contract.
    #[arg(long = "contract", env = "CARBON_CONTRACT_ADDRESS", global = true)]
    pub contract_address: Option<Address>,

    /// Path to a TOML configuration file. Flags and environment variables
    /// override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Block explorer base URL used for transaction links.
    #[arg(long, global = true)]
    pub explorer_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CARBON_LOG_LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Log output format: "human" or "json".
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// File holding the operator private key as hex.
    #[arg(long, global = true)]
    pub key_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the number of credits issued so far.
    Total,

    /// Show one credit record.
    View {
        #[arg(long)]
        id: CreditId,
        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the location of one credit.
    Location {
        #[arg(long)]
        id: CreditId,
    },

    /// Issue a new credit.
    Issue {
        /// Receiving account.
        #[arg(long)]
        to: Address,
        /// Tons of CO₂.
        #[arg(long)]
        amount: u32,
        #[arg(long)]
        location: String,
    },

    /// Transfer some or all of a credit to another account.
    Transfer {
        #[arg(long)]
        id: CreditId,
        #[arg(long)]
        to: Address,
        #[arg(long)]
        amount: u32,
    },

    /// Permanently retire a credit.
    Retire {
        #[arg(long)]
        id: CreditId,
    },

    /// Change the recorded location of a credit.
    Relocate {
        #[arg(long)]
        id: CreditId,
        #[arg(long)]
        location: String,
    },

    /// Look up the receipt of a submitted transaction.
    Receipt {
        #[arg(long)]
        hash: TxHash,
        #[arg(long)]
        json: bool,
    },

    /// Print the account the configured private key signs for.
    Whoami,

    /// Run the operator dashboard.
    Serve {
        /// Listen address (defaults to the configured dashboard_bind).
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

impl Command {
    pub fn needs_key(&self) -> bool {
        matches!(
            self,
            Self::Issue { .. }
                | Self::Transfer { .. }
                | Self::Retire { .. }
                | Self::Relocate { .. }
                | Self::Whoami
        )
    }
}

impl Cli {
    /// Load the config file (if any) and overlay flags and environment values.
    pub fn resolve_config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_toml_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ClientConfig::default(),
        };

        if let Some(url) = &self.rpc_url {
            config.rpc_url = Some(url.clone());
        }
        if let Some(address) = self.contract_address {
            config.contract_address = Some(address);
        }
        if let Some(url) = &self.explorer_url {
            config.explorer_url = url.clone();
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if let Command::Serve { bind: Some(addr) } = self.command {
            config.dashboard_bind = addr;
        }
        Ok(config)
    }

    /// Read the operator key. `CARBON_PRIVATE_KEY` wins over `--key-file`.
    pub fn read_key(&self) -> anyhow::Result<Option<Zeroizing<String>>> {
        self.read_key_from(std::env::var(PRIVATE_KEY_ENV).ok().map(Zeroizing::new))
    }

    fn read_key_from(
        &self,
        env_key: Option<Zeroizing<String>>,
    ) -> anyhow::Result<Option<Zeroizing<String>>> {
        if let Some(key) = env_key.filter(|key| !key.trim().is_empty()) {
            return Ok(Some(Zeroizing::new(key.trim().to_string())));
        }
        match &self.key_file {
            Some(path) => {
                let text = Zeroizing::new(
                    std::fs::read_to_string(path)
                        .with_context(|| format!("reading key file {}", path.display()))?,
                );
                Ok(Some(Zeroizing::new(text.trim().to_string())))
            }
            None => Ok(None),
        }
    }
}
