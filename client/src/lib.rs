//! Administrative client for the carbon credit contract.
//!
//! [`LedgerClient`] maps operator actions onto contract calls. Reads go out as
//! `eth_call`; writes are built, signed locally with the [`OperatorSession`]
//! key, and submitted with `eth_sendRawTransaction`. The contract decides
//! whether a write is accepted; nothing is cached or retried here.

pub mod client;
pub mod config;
pub mod error;
pub mod receipt;
pub mod rpc;
pub mod session;

pub use client::LedgerClient;
pub use config::{ClientConfig, GasConfig};
pub use error::ClientError;
pub use receipt::{ReceiptStatus, TransactionReceipt};
pub use rpc::{HttpTransport, RpcError, RpcTransport};
pub use session::OperatorSession;
