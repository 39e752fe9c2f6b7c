use thiserror::Error;

/// Malformed ABI call or return data.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AbiError {
    #[error("data too short: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("value does not fit {ty}")]
    OutOfRange { ty: &'static str },

    #[error("bool word is neither 0 nor 1")]
    InvalidBool,

    #[error("address word has non-zero high bytes")]
    InvalidAddress,

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown function selector 0x{0}")]
    UnknownSelector(String),
}

/// Malformed RLP input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RlpError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("non-canonical encoding: {0}")]
    NonCanonical(&'static str),

    #[error("trailing bytes after item")]
    TrailingBytes,

    #[error("expected a list")]
    ExpectedList,

    #[error("expected a byte string")]
    ExpectedBytes,

    #[error("integer does not fit in {0} bytes")]
    IntegerOverflow(usize),
}

/// Failure to decode a raw signed transaction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("rlp: {0}")]
    Rlp(#[from] RlpError),

    #[error("expected 9 fields, got {0}")]
    FieldCount(usize),

    #[error("invalid field {0}")]
    Field(&'static str),

    #[error("unsupported v value {0} (only EIP-155 signatures are accepted)")]
    UnsupportedV(u64),
}
