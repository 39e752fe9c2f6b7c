//! Chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// EIP-155 chain id reported by the RPC endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const MAINNET: Self = Self(1);
    pub const SEPOLIA: Self = Self(11_155_111);

    /// Human-readable name for well-known chains.
    pub fn name(&self) -> Option<&'static str> {
        match self.0 {
            1 => Some("mainnet"),
            11_155_111 => Some("sepolia"),
            17_000 => Some("holesky"),
            31_337 => Some("anvil"),
            _ => None,
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({name})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}
