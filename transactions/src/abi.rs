//! Solidity ABI encoding for the static and string types the contract uses.
//!
//! Encoding follows the standard head/tail layout: every argument takes one
//! 32-byte head word; `string` heads hold an offset into the tail, where the
//! length word and right-padded bytes live.

use carbon_types::Address;

use crate::error::AbiError;

const WORD: usize = 32;

/// A single ABI value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    /// Any `uintN` with N <= 64.
    Uint(u64),
    Bool(bool),
    String(String),
}

/// First four bytes of `keccak256(signature)`.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = carbon_crypto::keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

fn uint_word(value: u64) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

fn address_word(address: &Address) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

/// Encode a sequence of tokens as a tuple (no selector).
pub fn encode_tokens(tokens: &[Token]) -> Vec<u8> {
    let head_len = tokens.len() * WORD;
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for token in tokens {
        match token {
            Token::Address(address) => head.extend_from_slice(&address_word(address)),
            Token::Uint(value) => head.extend_from_slice(&uint_word(*value)),
            Token::Bool(value) => head.extend_from_slice(&uint_word(u64::from(*value))),
            Token::String(s) => {
                head.extend_from_slice(&uint_word((head_len + tail.len()) as u64));
                let bytes = s.as_bytes();
                tail.extend_from_slice(&uint_word(bytes.len() as u64));
                tail.extend_from_slice(bytes);
                tail.resize(tail.len() + padded_len(bytes.len()) - bytes.len(), 0);
            }
        }
    }

    head.extend_from_slice(&tail);
    head
}

/// Encode call data: selector followed by the argument tuple.
pub fn encode_call(selector: [u8; 4], tokens: &[Token]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + tokens.len() * WORD);
    out.extend_from_slice(&selector);
    out.extend_from_slice(&encode_tokens(tokens));
    out
}

/// Strict reader over an ABI-encoded tuple.
///
/// Head words are addressed by position; every accessor checks that the word
/// is a canonical encoding of the requested type.
pub struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn slice(&self, start: usize, len: usize) -> Result<&'a [u8], AbiError> {
        let end = start.checked_add(len).ok_or(AbiError::OutOfRange { ty: "offset" })?;
        self.data.get(start..end).ok_or(AbiError::Truncated {
            needed: end,
            available: self.data.len(),
        })
    }

    fn word_at(&self, offset: usize) -> Result<&'a [u8], AbiError> {
        self.slice(offset, WORD)
    }

    fn word(&self, index: usize) -> Result<&'a [u8], AbiError> {
        self.word_at(index * WORD)
    }

    fn uint_from(word: &[u8], bits: u32, ty: &'static str) -> Result<u64, AbiError> {
        if word[..24].iter().any(|&b| b != 0) {
            return Err(AbiError::OutOfRange { ty });
        }
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&word[24..]);
        let value = u64::from_be_bytes(buf);
        if bits < 64 && value >> bits != 0 {
            return Err(AbiError::OutOfRange { ty });
        }
        Ok(value)
    }

    pub fn uint16(&self, index: usize) -> Result<u16, AbiError> {
        Self::uint_from(self.word(index)?, 16, "uint16").map(|v| v as u16)
    }

    pub fn uint32(&self, index: usize) -> Result<u32, AbiError> {
        Self::uint_from(self.word(index)?, 32, "uint32").map(|v| v as u32)
    }

    pub fn bool(&self, index: usize) -> Result<bool, AbiError> {
        match Self::uint_from(self.word(index)?, 64, "bool") {
            Ok(0) => Ok(false),
            Ok(1) => Ok(true),
            _ => Err(AbiError::InvalidBool),
        }
    }

    pub fn address(&self, index: usize) -> Result<Address, AbiError> {
        let word = self.word(index)?;
        if word[..12].iter().any(|&b| b != 0) {
            return Err(AbiError::InvalidAddress);
        }
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Ok(Address::new(bytes))
    }

    pub fn string(&self, index: usize) -> Result<String, AbiError> {
        let offset = Self::uint_from(self.word(index)?, 64, "string offset")?;
        let offset = usize::try_from(offset).map_err(|_| AbiError::OutOfRange { ty: "string offset" })?;
        let len = Self::uint_from(self.word_at(offset)?, 64, "string length")?;
        let len = usize::try_from(len).map_err(|_| AbiError::OutOfRange { ty: "string length" })?;
        let bytes = self.slice(offset + WORD, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| AbiError::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint_is_left_padded() {
        let encoded = encode_tokens(&[Token::Uint(0x1234)]);
        assert_eq!(encoded.len(), 32);
        assert_eq!(&encoded[30..], &[0x12, 0x34]);
        assert!(encoded[..30].iter().all(|&b| b == 0));
    }

    #[test]
    fn address_is_left_padded() {
        let addr = Address::new([0xAA; 20]);
        let encoded = encode_tokens(&[Token::Address(addr)]);
        assert!(encoded[..12].iter().all(|&b| b == 0));
        assert_eq!(&encoded[12..], &[0xAA; 20]);
    }

    #[test]
    fn string_layout_matches_solidity() {
        // f(uint16 7, string "abc")
        let encoded = encode_tokens(&[Token::Uint(7), Token::String("abc".into())]);
        assert_eq!(encoded.len(), 4 * 32);
        assert_eq!(encoded[31], 7);
        assert_eq!(encoded[63], 0x40, "offset points past the two head words");
        assert_eq!(encoded[95], 3, "length word");
        assert_eq!(&encoded[96..99], b"abc");
        assert!(encoded[99..].iter().all(|&b| b == 0));
    }

    #[test]
    fn empty_string_has_only_length_word() {
        let encoded = encode_tokens(&[Token::String(String::new())]);
        assert_eq!(encoded.len(), 64);
        assert_eq!(encoded[31], 0x20);
        assert!(encoded[32..].iter().all(|&b| b == 0));
    }

    #[test]
    fn string_of_exactly_one_word_is_not_over_padded() {
        let s = "x".repeat(32);
        let encoded = encode_tokens(&[Token::String(s)]);
        assert_eq!(encoded.len(), 32 + 32 + 32);
    }

    #[test]
    fn encode_call_prefixes_selector() {
        let data = encode_call([1, 2, 3, 4], &[Token::Bool(true)]);
        assert_eq!(&data[..4], &[1, 2, 3, 4]);
        assert_eq!(data.len(), 36);
        assert_eq!(data[35], 1);
    }

    #[test]
    fn decoder_reads_mixed_tuple() {
        let addr = Address::new([0x11; 20]);
        let encoded = encode_tokens(&[
            Token::Uint(9),
            Token::Address(addr),
            Token::String("Kenya".into()),
            Token::Bool(true),
        ]);
        let d = Decoder::new(&encoded);
        assert_eq!(d.uint16(0).unwrap(), 9);
        assert_eq!(d.address(1).unwrap(), addr);
        assert_eq!(d.string(2).unwrap(), "Kenya");
        assert!(d.bool(3).unwrap());
    }

    #[test]
    fn decoder_rejects_oversized_uint16() {
        let encoded = encode_tokens(&[Token::Uint(70_000)]);
        assert_eq!(
            Decoder::new(&encoded).uint16(0),
            Err(AbiError::OutOfRange { ty: "uint16" })
        );
    }

    #[test]
    fn decoder_rejects_bad_bool() {
        let encoded = encode_tokens(&[Token::Uint(2)]);
        assert_eq!(Decoder::new(&encoded).bool(0), Err(AbiError::InvalidBool));
    }

    #[test]
    fn decoder_rejects_dirty_address() {
        let mut encoded = encode_tokens(&[Token::Address(Address::new([1; 20]))]);
        encoded[0] = 1;
        assert_eq!(Decoder::new(&encoded).address(0), Err(AbiError::InvalidAddress));
    }

    #[test]
    fn decoder_reports_truncation() {
        let d = Decoder::new(&[0u8; 10]);
        assert!(matches!(d.uint32(0), Err(AbiError::Truncated { .. })));
    }

    #[test]
    fn decoder_rejects_string_past_end() {
        let mut encoded = encode_tokens(&[Token::String("abc".into())]);
        // Claim a longer string than the data holds.
        encoded[63] = 200;
        assert!(matches!(
            Decoder::new(&encoded).string(0),
            Err(AbiError::Truncated { .. })
        ));
    }

    #[test]
    fn decoder_rejects_invalid_utf8() {
        let mut encoded = encode_tokens(&[Token::String("ab".into())]);
        encoded[64] = 0xFF;
        assert_eq!(Decoder::new(&encoded).string(0), Err(AbiError::InvalidUtf8));
    }
}
