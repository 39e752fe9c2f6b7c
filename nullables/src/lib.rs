//! Nullable infrastructure for deterministic testing.
//!
//! The remote node and contract are reached through the
//! [`RpcTransport`](carbon_client::RpcTransport) trait. This crate provides an
//! in-memory implementation that:
//! - Answers the JSON-RPC methods the client uses
//! - Verifies signatures, chain id and nonces on submitted transactions
//! - Applies carbon credit rules the way the deployed contract does
//! - Records every request for assertions
//!
//! Usage: build a `LedgerClient` over a [`NullLedger`] instead of an
//! `HttpTransport`.

pub mod contract;
pub mod ledger;

pub use contract::{CreditBook, Revert};
pub use ledger::{NullLedger, RecordedRequest};
