//! In-memory carbon credit contract.

use std::collections::BTreeMap;
use std::fmt;

use carbon_transactions::abi::{encode_call, encode_tokens, selector, Token};
use carbon_transactions::contract::encode_credit;
use carbon_transactions::CarbonCreditCall;
use carbon_types::{Address, Credit};

/// A contract revert with its reason string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Revert(pub String);

impl Revert {
    fn new(reason: &str) -> Self {
        Self(reason.to_string())
    }

    /// ABI-encoded `Error(string)` payload, as nodes return it in error data.
    pub fn data(&self) -> Vec<u8> {
        encode_call(selector("Error(string)"), &[Token::String(self.0.clone())])
    }
}

impl fmt::Display for Revert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contract storage: the credit mapping and the id counter.
///
/// Ids start at 1; `next_id` is the newest id and the count issued. A partial
/// transfer splits the credit, creating a new id owned by the recipient.
#[derive(Clone, Debug, Default)]
pub struct CreditBook {
    next_id: u16,
    credits: BTreeMap<u16, Credit>,
}

impl CreditBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> u16 {
        self.next_id
    }

    pub fn get(&self, id: u16) -> Option<&Credit> {
        self.credits.get(&id)
    }

    /// Mint directly, bypassing transactions. Returns the new id.
    pub fn mint(&mut self, owner: Address, amount: u32, location: &str) -> Result<u16, Revert> {
        let id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| Revert::new("credit ids exhausted"))?;
        self.next_id = id;
        self.credits.insert(
            id,
            Credit {
                id,
                owner,
                amount,
                retired: false,
                location: location.to_string(),
            },
        );
        Ok(id)
    }

    fn owned_mut(&mut self, id: u16, sender: Address) -> Result<&mut Credit, Revert> {
        let credit = self
            .credits
            .get_mut(&id)
            .ok_or_else(|| Revert::new("credit does not exist"))?;
        if credit.owner != sender {
            return Err(Revert::new("caller is not the owner"));
        }
        if credit.retired {
            return Err(Revert::new("credit is retired"));
        }
        Ok(credit)
    }

    /// Apply a state-changing call from `sender`. On revert, storage is unchanged.
    pub fn execute(&mut self, sender: Address, call: &CarbonCreditCall) -> Result<(), Revert> {
        match call {
            CarbonCreditCall::IssueCredit {
                to,
                amount,
                location,
            } => {
                if *amount == 0 {
                    return Err(Revert::new("amount must be positive"));
                }
                self.mint(*to, *amount, location)?;
            }
            CarbonCreditCall::TransferCredit { id, to, amount } => {
                let credit = self.owned_mut(id.get(), sender)?;
                if *amount == 0 || *amount > credit.amount {
                    return Err(Revert::new("invalid transfer amount"));
                }
                if *amount == credit.amount {
                    credit.owner = *to;
                } else {
                    let location = credit.location.clone();
                    if self.next_id == u16::MAX {
                        return Err(Revert::new("credit ids exhausted"));
                    }
                    if let Some(source) = self.credits.get_mut(&id.get()) {
                        source.amount -= amount;
                    }
                    self.mint(*to, *amount, &location)?;
                }
            }
            CarbonCreditCall::RetireCredit { id } => {
                self.owned_mut(id.get(), sender)?.retired = true;
            }
            CarbonCreditCall::UpdateCreditLocation { id, new_location } => {
                self.owned_mut(id.get(), sender)?.location = new_location.clone();
            }
            // view functions cost gas but change nothing when sent as transactions
            CarbonCreditCall::GetCreditLocation { .. }
            | CarbonCreditCall::Credits { .. }
            | CarbonCreditCall::NextId => {}
        }
        Ok(())
    }

    /// Dry-run a call as `eth_call` does: reads return data, writes are
    /// checked against a scratch copy and return nothing.
    pub fn call(&self, sender: Address, call: &CarbonCreditCall) -> Result<Vec<u8>, Revert> {
        match call {
            CarbonCreditCall::NextId => Ok(encode_tokens(&[Token::Uint(u64::from(self.next_id))])),
            // public mapping getter: unset slots read as zeroes
            CarbonCreditCall::Credits { id } => Ok(encode_credit(
                &self.credits.get(&id.get()).cloned().unwrap_or(Credit {
                    id: 0,
                    owner: Address::ZERO,
                    amount: 0,
                    retired: false,
                    location: String::new(),
                }),
            )),
            CarbonCreditCall::GetCreditLocation { id } => {
                let credit = self
                    .credits
                    .get(&id.get())
                    .ok_or_else(|| Revert::new("credit does not exist"))?;
                Ok(encode_tokens(&[Token::String(credit.location.clone())]))
            }
            write => {
                self.clone().execute(sender, write)?;
                Ok(Vec::new())
            }
        }
    }
}
