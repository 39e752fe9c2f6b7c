//! Shared utilities for the carbon ledger client.

pub mod logging;
pub mod units;

pub use logging::{init_logging, LogFormat};
pub use units::{format_tons, gwei_to_wei};
