//! Carbon credit record as stored by the remote contract.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::error::TypesError;

/// Identifier of a credit on the contract (`uint16`, never zero).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct CreditId(u16);

impl CreditId {
    pub fn new(raw: u16) -> Result<Self, TypesError> {
        if raw == 0 {
            return Err(TypesError::InvalidCreditId("id must be at least 1".into()));
        }
        Ok(Self(raw))
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl TryFrom<u16> for CreditId {
    type Error = TypesError;

    fn try_from(raw: u16) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl TryFrom<u64> for CreditId {
    type Error = TypesError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        let narrow = u16::try_from(raw).map_err(|_| {
            TypesError::InvalidCreditId(format!("{raw} exceeds the uint16 range"))
        })?;
        Self::new(narrow)
    }
}

impl From<CreditId> for u16 {
    fn from(id: CreditId) -> Self {
        id.0
    }
}

impl FromStr for CreditId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw: u64 = s
            .trim()
            .parse()
            .map_err(|_| TypesError::InvalidCreditId(format!("not a positive integer: {s:?}")))?;
        Self::try_from(raw)
    }
}

impl fmt::Display for CreditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A credit record as returned by the contract's `credits(id)` getter.
///
/// `id` is kept raw: an unset mapping slot comes back as all zeroes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credit {
    pub id: u16,
    pub owner: Address,
    /// Tons of CO₂.
    pub amount: u32,
    pub retired: bool,
    pub location: String,
}
