//! The carbon credit contract's fixed function interface.

use carbon_types::{Address, Credit, CreditId};

use crate::abi::{encode_call, encode_tokens, selector, Decoder, Token};
use crate::error::AbiError;

/// One invocation of a contract function, with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CarbonCreditCall {
    IssueCredit {
        to: Address,
        amount: u32,
        location: String,
    },
    TransferCredit {
        id: CreditId,
        to: Address,
        amount: u32,
    },
    RetireCredit {
        id: CreditId,
    },
    UpdateCreditLocation {
        id: CreditId,
        new_location: String,
    },
    GetCreditLocation {
        id: CreditId,
    },
    Credits {
        id: CreditId,
    },
    NextId,
}

const ISSUE_CREDIT: &str = "issueCredit(address,uint32,string)";
const TRANSFER_CREDIT: &str = "transferCredit(uint16,address,uint32)";
const RETIRE_CREDIT: &str = "retireCredit(uint16)";
const UPDATE_CREDIT_LOCATION: &str = "updateCreditLocation(uint16,string)";
const GET_CREDIT_LOCATION: &str = "getCreditLocation(uint16)";
const CREDITS: &str = "credits(uint16)";
const NEXT_ID: &str = "nextId()";

const ALL_SIGNATURES: [&str; 7] = [
    ISSUE_CREDIT,
    TRANSFER_CREDIT,
    RETIRE_CREDIT,
    UPDATE_CREDIT_LOCATION,
    GET_CREDIT_LOCATION,
    CREDITS,
    NEXT_ID,
];

impl CarbonCreditCall {
    /// Canonical Solidity signature used to derive the selector.
    pub fn signature(&self) -> &'static str {
        match self {
            Self::IssueCredit { .. } => ISSUE_CREDIT,
            Self::TransferCredit { .. } => TRANSFER_CREDIT,
            Self::RetireCredit { .. } => RETIRE_CREDIT,
            Self::UpdateCreditLocation { .. } => UPDATE_CREDIT_LOCATION,
            Self::GetCreditLocation { .. } => GET_CREDIT_LOCATION,
            Self::Credits { .. } => CREDITS,
            Self::NextId => NEXT_ID,
        }
    }

    /// Function name without the argument list.
    pub fn name(&self) -> &'static str {
        let sig = self.signature();
        &sig[..sig.find('(').unwrap_or(sig.len())]
    }

    /// Whether the call mutates contract state and must be sent as a transaction.
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            Self::IssueCredit { .. }
                | Self::TransferCredit { .. }
                | Self::RetireCredit { .. }
                | Self::UpdateCreditLocation { .. }
        )
    }

    pub fn selector(&self) -> [u8; 4] {
        selector(self.signature())
    }

    /// Ordered argument list.
    pub fn tokens(&self) -> Vec<Token> {
        match self {
            Self::IssueCredit {
                to,
                amount,
                location,
            } => vec![
                Token::Address(*to),
                Token::Uint(u64::from(*amount)),
                Token::String(location.clone()),
            ],
            Self::TransferCredit { id, to, amount } => vec![
                Token::Uint(u64::from(id.get())),
                Token::Address(*to),
                Token::Uint(u64::from(*amount)),
            ],
            Self::RetireCredit { id } | Self::GetCreditLocation { id } | Self::Credits { id } => {
                vec![Token::Uint(u64::from(id.get()))]
            }
            Self::UpdateCreditLocation { id, new_location } => vec![
                Token::Uint(u64::from(id.get())),
                Token::String(new_location.clone()),
            ],
            Self::NextId => Vec::new(),
        }
    }

    /// Full call data: selector plus encoded arguments.
    pub fn encode(&self) -> Vec<u8> {
        encode_call(self.selector(), &self.tokens())
    }

    /// Decode call data back into a call. Used by test doubles of the contract.
    pub fn decode(calldata: &[u8]) -> Result<Self, AbiError> {
        if calldata.len() < 4 {
            return Err(AbiError::Truncated {
                needed: 4,
                available: calldata.len(),
            });
        }
        let (sel, args) = calldata.split_at(4);
        let signature = ALL_SIGNATURES
            .into_iter()
            .find(|sig| selector(sig) == sel)
            .ok_or_else(|| AbiError::UnknownSelector(hex::encode(sel)))?;

        let d = Decoder::new(args);
        let id = |index: usize| -> Result<CreditId, AbiError> {
            CreditId::new(d.uint16(index)?).map_err(|_| AbiError::OutOfRange { ty: "credit id" })
        };

        Ok(match signature {
            ISSUE_CREDIT => Self::IssueCredit {
                to: d.address(0)?,
                amount: d.uint32(1)?,
                location: d.string(2)?,
            },
            TRANSFER_CREDIT => Self::TransferCredit {
                id: id(0)?,
                to: d.address(1)?,
                amount: d.uint32(2)?,
            },
            RETIRE_CREDIT => Self::RetireCredit { id: id(0)? },
            UPDATE_CREDIT_LOCATION => Self::UpdateCreditLocation {
                id: id(0)?,
                new_location: d.string(1)?,
            },
            GET_CREDIT_LOCATION => Self::GetCreditLocation { id: id(0)? },
            CREDITS => Self::Credits { id: id(0)? },
            _ => Self::NextId,
        })
    }
}

/// Decode the `credits(uint16)` return tuple.
pub fn decode_credit(data: &[u8]) -> Result<Credit, AbiError> {
    let d = Decoder::new(data);
    Ok(Credit {
        id: d.uint16(0)?,
        owner: d.address(1)?,
        amount: d.uint32(2)?,
        retired: d.bool(3)?,
        location: d.string(4)?,
    })
}

/// Encode a credit as `credits(uint16)` return data.
pub fn encode_credit(credit: &Credit) -> Vec<u8> {
    encode_tokens(&[
        Token::Uint(u64::from(credit.id)),
        Token::Address(credit.owner),
        Token::Uint(u64::from(credit.amount)),
        Token::Bool(credit.retired),
        Token::String(credit.location.clone()),
    ])
}

/// Decode the `nextId()` return value.
pub fn decode_next_id(data: &[u8]) -> Result<u16, AbiError> {
    Decoder::new(data).uint16(0)
}

/// Decode the `getCreditLocation(uint16)` return value.
pub fn decode_location(data: &[u8]) -> Result<String, AbiError> {
    Decoder::new(data).string(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u16) -> CreditId {
        CreditId::new(raw).unwrap()
    }

    #[test]
    fn selectors_are_distinct() {
        let mut seen: Vec<[u8; 4]> = ALL_SIGNATURES.iter().map(|s| selector(s)).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), ALL_SIGNATURES.len());
    }

    #[test]
    fn names_strip_argument_list() {
        assert_eq!(CarbonCreditCall::NextId.name(), "nextId");
        assert_eq!(CarbonCreditCall::RetireCredit { id: id(1) }.name(), "retireCredit");
    }

    #[test]
    fn only_mutating_calls_are_writes() {
        assert!(CarbonCreditCall::RetireCredit { id: id(1) }.is_write());
        assert!(!CarbonCreditCall::Credits { id: id(1) }.is_write());
        assert!(!CarbonCreditCall::NextId.is_write());
    }

    #[test]
    fn next_id_calldata_is_bare_selector() {
        assert_eq!(CarbonCreditCall::NextId.encode().len(), 4);
    }

    #[test]
    fn issue_credit_calldata_layout() {
        let call = CarbonCreditCall::IssueCredit {
            to: Address::new([0xAB; 20]),
            amount: 50,
            location: "Amazon Rainforest, Brazil".into(),
        };
        let data = call.encode();
        assert_eq!(&data[..4], &selector(ISSUE_CREDIT));
        // address, amount, offset, length, one padded data word
        assert_eq!(data.len(), 4 + 5 * 32);
        assert_eq!(data[4 + 63], 50);
        assert_eq!(data[4 + 95], 0x60);
    }

    #[test]
    fn calldata_decodes_to_same_call() {
        let calls = [
            CarbonCreditCall::IssueCredit {
                to: Address::new([1; 20]),
                amount: 7,
                location: "Borneo".into(),
            },
            CarbonCreditCall::TransferCredit {
                id: id(3),
                to: Address::new([2; 20]),
                amount: 1,
            },
            CarbonCreditCall::RetireCredit { id: id(4) },
            CarbonCreditCall::UpdateCreditLocation {
                id: id(5),
                new_location: "Patagonia".into(),
            },
            CarbonCreditCall::GetCreditLocation { id: id(6) },
            CarbonCreditCall::Credits { id: id(7) },
            CarbonCreditCall::NextId,
        ];
        for call in calls {
            assert_eq!(CarbonCreditCall::decode(&call.encode()).unwrap(), call);
        }
    }

    #[test]
    fn unknown_selector_rejected() {
        assert!(matches!(
            CarbonCreditCall::decode(&[0xde, 0xad, 0xbe, 0xef]),
            Err(AbiError::UnknownSelector(_))
        ));
    }

    #[test]
    fn credit_return_data_decodes() {
        let credit = Credit {
            id: 12,
            owner: Address::new([0x42; 20]),
            amount: 50,
            retired: true,
            location: "Amazon Rainforest, Brazil".into(),
        };
        assert_eq!(decode_credit(&encode_credit(&credit)).unwrap(), credit);
    }

    #[test]
    fn empty_return_data_is_an_error() {
        assert!(decode_next_id(&[]).is_err());
        assert!(decode_credit(&[]).is_err());
        assert!(decode_location(&[]).is_err());
    }
}
