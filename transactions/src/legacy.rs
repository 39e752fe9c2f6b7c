//! Legacy (type 0) transactions with EIP-155 replay protection.

use carbon_crypto::{hash_transaction, keccak256, recover_address, sign_prehash, CryptoError};
use carbon_types::{Address, ChainId, PrivateKey, Signature, TxHash};

use crate::error::DecodeError;
use crate::rlp::{self, RlpStream};

/// An unsigned contract transaction.
///
/// Built fresh for every submission and consumed by [`TransactionRequest::sign`],
/// so a request (and its nonce) cannot be signed twice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRequest {
    /// Expected signer. Not part of the encoding; checked at signing time.
    pub from: Address,
    pub nonce: u64,
    /// Wei per unit of gas.
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    /// Wei transferred with the call.
    pub value: u128,
    pub data: Vec<u8>,
    pub chain_id: ChainId,
}

impl TransactionRequest {
    fn append_body(&self, stream: &mut RlpStream) {
        stream
            .append_u64(self.nonce)
            .append_u128(self.gas_price)
            .append_u64(self.gas_limit)
            .append_bytes(self.to.as_bytes())
            .append_u128(self.value)
            .append_bytes(&self.data);
    }

    /// `rlp([nonce, gasPrice, gasLimit, to, value, data, chainId, 0, 0])`
    pub fn signing_payload(&self) -> Vec<u8> {
        let mut stream = RlpStream::new();
        self.append_body(&mut stream);
        stream.append_u64(self.chain_id.0).append_u64(0).append_u64(0);
        stream.finish()
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        keccak256(&self.signing_payload())
    }

    /// Sign with the given key, which must belong to `from`.
    pub fn sign(self, key: &PrivateKey) -> Result<SignedTransaction, CryptoError> {
        let prehash = self.signing_hash();
        let signature = sign_prehash(&prehash, key)?;

        let signer = recover_address(&prehash, &signature)?;
        if signer != self.from {
            return Err(CryptoError::Signing(format!(
                "signing key belongs to {signer}, transaction is from {}",
                self.from
            )));
        }

        let v = eip155_v(self.chain_id, signature.recovery_id).ok_or_else(|| {
            CryptoError::Signing(format!("chain id {} is too large for EIP-155", self.chain_id))
        })?;
        let mut stream = RlpStream::new();
        self.append_body(&mut stream);
        stream
            .append_u64(v)
            .append_scalar(&signature.r)
            .append_scalar(&signature.s);
        let raw = stream.finish();
        let hash = hash_transaction(&raw);

        Ok(SignedTransaction { raw, hash })
    }
}

/// `recovery_id + 35 + 2 * chain_id`, or `None` when that overflows a `u64`.
fn eip155_v(chain_id: ChainId, recovery_id: u8) -> Option<u64> {
    chain_id
        .0
        .checked_mul(2)?
        .checked_add(35 + u64::from(recovery_id))
}

/// A signed, RLP-encoded transaction ready for `eth_sendRawTransaction`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedTransaction {
    raw: Vec<u8>,
    hash: TxHash,
}

impl SignedTransaction {
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// `0x`-prefixed hex of the raw bytes.
    pub fn raw_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    pub fn hash(&self) -> TxHash {
        self.hash
    }
}

/// A raw transaction taken apart again: fields, signature and hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedTransaction {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_limit: u64,
    pub to: Address,
    pub value: u128,
    pub data: Vec<u8>,
    pub chain_id: ChainId,
    pub signature: Signature,
    pub hash: TxHash,
}

impl DecodedTransaction {
    /// Decode an EIP-155 signed legacy transaction.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let item = rlp::decode(raw)?;
        let fields = item.as_list()?;
        if fields.len() != 9 {
            return Err(DecodeError::FieldCount(fields.len()));
        }

        let to = Address::from_slice(fields[3].as_bytes()?).map_err(|_| DecodeError::Field("to"))?;
        let v = fields[6].as_u64()?;
        if v < 35 {
            return Err(DecodeError::UnsupportedV(v));
        }
        let chain_id = ChainId((v - 35) / 2);
        let recovery_id = ((v - 35) % 2) as u8;

        Ok(Self {
            nonce: fields[0].as_u64()?,
            gas_price: fields[1].as_u128()?,
            gas_limit: fields[2].as_u64()?,
            to,
            value: fields[4].as_u128()?,
            data: fields[5].as_bytes()?.to_vec(),
            chain_id,
            signature: Signature {
                r: fields[7].as_uint::<32>()?,
                s: fields[8].as_uint::<32>()?,
                recovery_id,
            },
            hash: hash_transaction(raw),
        })
    }

    /// Recover the sender from the signature.
    pub fn sender(&self) -> Result<Address, CryptoError> {
        let unsigned = TransactionRequest {
            from: Address::ZERO,
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to,
            value: self.value,
            data: self.data.clone(),
            chain_id: self.chain_id,
        };
        recover_address(&unsigned.signing_hash(), &self.signature)
    }
}
