//! Form payloads and the action picker.
//!
//! Fields arrive as raw strings, and missing ones default to empty, so that
//! malformed input renders an error page instead of a bare extractor rejection.

use std::str::FromStr;

use serde::Deserialize;
use zeroize::Zeroize;

use carbon_client::ClientError;
use carbon_types::{Address, CreditId};

/// The operator actions offered on the home page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    View,
    Issue,
    Transfer,
    Retire,
    UpdateLocation,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Issue,
        Action::Transfer,
        Action::Retire,
        Action::UpdateLocation,
    ];

    /// Path segment under `/actions/`.
    pub fn slug(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Issue => "issue",
            Self::Transfer => "transfer",
            Self::Retire => "retire",
            Self::UpdateLocation => "location",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::View => "View Credit",
            Self::Issue => "Issue Credit",
            Self::Transfer => "Transfer Credit",
            Self::Retire => "Retire Credit",
            Self::UpdateLocation => "Update Location",
        }
    }

    pub fn is_write(self) -> bool {
        !matches!(self, Self::View)
    }
}

impl FromStr for Action {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL.into_iter().find(|a| a.slug() == s).ok_or(())
    }
}

#[derive(Deserialize)]
pub struct SessionForm {
    #[serde(default)]
    pub private_key: String,
}

impl Drop for SessionForm {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    pub id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IssueForm {
    pub to: String,
    pub amount: String,
    pub location: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TransferForm {
    pub id: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RetireForm {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LocationForm {
    pub id: String,
    pub new_location: String,
}

pub fn parse_id(raw: &str) -> Result<CreditId, ClientError> {
    Ok(raw.parse::<CreditId>()?)
}

pub fn parse_address(raw: &str) -> Result<Address, ClientError> {
    Ok(Address::parse(raw.trim())?)
}

/// Tons of CO₂. Zero is let through so the client rejects it with its own message.
pub fn parse_amount(raw: &str) -> Result<u32, ClientError> {
    raw.trim()
        .parse::<u32>()
        .map_err(|_| ClientError::Input(format!("amount must be a whole number of tons, got {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_roundtrip() {
        for action in Action::ALL {
            assert_eq!(action.slug().parse::<Action>(), Ok(action));
        }
        assert!("delete".parse::<Action>().is_err());
    }

    #[test]
    fn only_view_is_read_only() {
        assert!(!Action::View.is_write());
        assert!(Action::ALL.iter().filter(|a| a.is_write()).count() == 4);
    }

    #[test]
    fn id_parsing() {
        assert_eq!(parse_id(" 7 ").unwrap().get(), 7);
        assert!(matches!(parse_id("0"), Err(ClientError::Input(_))));
        assert!(matches!(parse_id("70000"), Err(ClientError::Input(_))));
        assert!(matches!(parse_id("abc"), Err(ClientError::Input(_))));
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount("50").unwrap(), 50);
        assert_eq!(parse_amount("0").unwrap(), 0);
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("1.5").is_err());
    }

    #[test]
    fn address_parsing() {
        assert!(parse_address("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").is_ok());
        assert!(matches!(parse_address("0x123"), Err(ClientError::Input(_))));
    }
}
