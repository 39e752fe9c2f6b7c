//! Recursive length prefix encoding.
//!
//! Only what transactions need: byte strings, unsigned integers (big-endian,
//! no leading zeros) and flat or nested lists. The decoder rejects every
//! non-canonical form so that a decoded transaction re-encodes to the same
//! bytes.

use crate::error::RlpError;

fn encode_length(len: usize, offset: u8, out: &mut Vec<u8>) {
    if len < 56 {
        out.push(offset + len as u8);
    } else {
        let be = trim_leading_zeros(&(len as u64).to_be_bytes()).to_vec();
        out.push(offset + 55 + be.len() as u8);
        out.extend_from_slice(&be);
    }
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

/// Append the encoding of a byte string.
pub fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
    if bytes.len() == 1 && bytes[0] < 0x80 {
        out.push(bytes[0]);
    } else {
        encode_length(bytes.len(), 0x80, out);
        out.extend_from_slice(bytes);
    }
}

/// Append the encoding of a big-endian unsigned integer, stripping leading zeros.
pub fn encode_uint(be_bytes: &[u8], out: &mut Vec<u8>) {
    encode_bytes(trim_leading_zeros(be_bytes), out);
}

/// Builder for a single RLP list.
#[derive(Default)]
pub struct RlpStream {
    payload: Vec<u8>,
}

impl RlpStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        encode_bytes(bytes, &mut self.payload);
        self
    }

    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        encode_uint(&value.to_be_bytes(), &mut self.payload);
        self
    }

    pub fn append_u128(&mut self, value: u128) -> &mut Self {
        encode_uint(&value.to_be_bytes(), &mut self.payload);
        self
    }

    /// Append a 256-bit scalar given as big-endian bytes.
    pub fn append_scalar(&mut self, be_bytes: &[u8; 32]) -> &mut Self {
        encode_uint(be_bytes, &mut self.payload);
        self
    }

    /// Wrap the appended items in a list header.
    pub fn finish(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        encode_length(self.payload.len(), 0xc0, &mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// A decoded RLP item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpItem {
    Bytes(Vec<u8>),
    List(Vec<RlpItem>),
}

impl RlpItem {
    pub fn as_bytes(&self) -> Result<&[u8], RlpError> {
        match self {
            Self::Bytes(b) => Ok(b),
            Self::List(_) => Err(RlpError::ExpectedBytes),
        }
    }

    pub fn as_list(&self) -> Result<&[RlpItem], RlpError> {
        match self {
            Self::List(items) => Ok(items),
            Self::Bytes(_) => Err(RlpError::ExpectedList),
        }
    }

    /// Interpret as a canonical unsigned integer of at most `N` bytes,
    /// returned left-padded to `N`.
    pub fn as_uint<const N: usize>(&self) -> Result<[u8; N], RlpError> {
        let bytes = self.as_bytes()?;
        if bytes.first() == Some(&0) {
            return Err(RlpError::NonCanonical("integer with leading zero"));
        }
        if bytes.len() > N {
            return Err(RlpError::IntegerOverflow(N));
        }
        let mut out = [0u8; N];
        out[N - bytes.len()..].copy_from_slice(bytes);
        Ok(out)
    }

    pub fn as_u64(&self) -> Result<u64, RlpError> {
        self.as_uint::<8>().map(u64::from_be_bytes)
    }

    pub fn as_u128(&self) -> Result<u128, RlpError> {
        self.as_uint::<16>().map(u128::from_be_bytes)
    }
}

/// Decode exactly one item spanning the whole input.
pub fn decode(data: &[u8]) -> Result<RlpItem, RlpError> {
    let (item, used) = decode_item(data)?;
    if used != data.len() {
        return Err(RlpError::TrailingBytes);
    }
    Ok(item)
}

fn read_long_length(data: &[u8], len_of_len: usize) -> Result<usize, RlpError> {
    let bytes = data.get(1..1 + len_of_len).ok_or(RlpError::UnexpectedEnd)?;
    if bytes[0] == 0 {
        return Err(RlpError::NonCanonical("length with leading zero"));
    }
    if len_of_len > std::mem::size_of::<usize>() {
        return Err(RlpError::IntegerOverflow(std::mem::size_of::<usize>()));
    }
    let len = bytes.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize);
    if len < 56 {
        return Err(RlpError::NonCanonical("long form for short payload"));
    }
    Ok(len)
}

fn payload(data: &[u8], start: usize, len: usize) -> Result<&[u8], RlpError> {
    let end = start.checked_add(len).ok_or(RlpError::UnexpectedEnd)?;
    data.get(start..end).ok_or(RlpError::UnexpectedEnd)
}

/// Decode one item from the front of `data`, returning it and its encoded size.
fn decode_item(data: &[u8]) -> Result<(RlpItem, usize), RlpError> {
    let prefix = *data.first().ok_or(RlpError::UnexpectedEnd)?;
    match prefix {
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![prefix]), 1)),
        0x80..=0xb7 => {
            let len = (prefix - 0x80) as usize;
            let body = payload(data, 1, len)?;
            if len == 1 && body[0] < 0x80 {
                return Err(RlpError::NonCanonical("single byte below 0x80 wrapped"));
            }
            Ok((RlpItem::Bytes(body.to_vec()), 1 + len))
        }
        0xb8..=0xbf => {
            let len_of_len = (prefix - 0xb7) as usize;
            let len = read_long_length(data, len_of_len)?;
            let body = payload(data, 1 + len_of_len, len)?;
            Ok((RlpItem::Bytes(body.to_vec()), 1 + len_of_len + len))
        }
        0xc0..=0xf7 => {
            let len = (prefix - 0xc0) as usize;
            let body = payload(data, 1, len)?;
            Ok((RlpItem::List(decode_list_body(body)?), 1 + len))
        }
        0xf8..=0xff => {
            let len_of_len = (prefix - 0xf7) as usize;
            let len = read_long_length(data, len_of_len)?;
            let body = payload(data, 1 + len_of_len, len)?;
            Ok((RlpItem::List(decode_list_body(body)?), 1 + len_of_len + len))
        }
    }
}

fn decode_list_body(mut body: &[u8]) -> Result<Vec<RlpItem>, RlpError> {
    let mut items = Vec::new();
    while !body.is_empty() {
        let (item, used) = decode_item(body)?;
        items.push(item);
        body = &body[used..];
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(bytes: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        encode_bytes(bytes, &mut out);
        out
    }

    #[test]
    fn reference_vectors() {
        assert_eq!(enc(b"dog"), vec![0x83, b'd', b'o', b'g']);
        assert_eq!(enc(b""), vec![0x80]);
        assert_eq!(enc(&[0x0f]), vec![0x0f]);
        assert_eq!(enc(&[0x80]), vec![0x81, 0x80]);

        let mut zero = Vec::new();
        encode_uint(&0u64.to_be_bytes(), &mut zero);
        assert_eq!(zero, vec![0x80]);

        let mut n = Vec::new();
        encode_uint(&1024u64.to_be_bytes(), &mut n);
        assert_eq!(n, vec![0x82, 0x04, 0x00]);

        let list = RlpStream::new().append_bytes(b"cat").append_bytes(b"dog").finish();
        assert_eq!(
            list,
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
        assert_eq!(RlpStream::new().finish(), vec![0xc0]);
    }

    #[test]
    fn long_string_uses_length_of_length() {
        let data = vec![b'a'; 56];
        let encoded = enc(&data);
        assert_eq!(&encoded[..2], &[0xb8, 56]);
        assert_eq!(decode(&encoded).unwrap(), RlpItem::Bytes(data));
    }

    #[test]
    fn long_list_roundtrip() {
        let mut stream = RlpStream::new();
        for i in 0..40u64 {
            stream.append_u64(i * 1000);
        }
        let encoded = stream.finish();
        assert!(encoded[0] >= 0xf8);
        let items = decode(&encoded).unwrap();
        let items = items.as_list().unwrap();
        assert_eq!(items.len(), 40);
        assert_eq!(items[39].as_u64().unwrap(), 39_000);
    }

    #[test]
    fn rejects_trailing_bytes() {
        assert_eq!(decode(&[0x80, 0x00]), Err(RlpError::TrailingBytes));
    }

    #[test]
    fn rejects_truncated_payload() {
        assert_eq!(decode(&[0x83, b'd', b'o']), Err(RlpError::UnexpectedEnd));
    }

    #[test]
    fn rejects_wrapped_single_byte() {
        assert!(matches!(decode(&[0x81, 0x05]), Err(RlpError::NonCanonical(_))));
    }

    #[test]
    fn rejects_long_form_for_short_payload() {
        assert!(matches!(
            decode(&[0xb8, 0x02, 0x01, 0x02]),
            Err(RlpError::NonCanonical(_))
        ));
    }

    #[test]
    fn integer_with_leading_zero_rejected() {
        let item = RlpItem::Bytes(vec![0x00, 0x01]);
        assert!(matches!(item.as_u64(), Err(RlpError::NonCanonical(_))));
    }

    #[test]
    fn integer_overflow_rejected() {
        let item = RlpItem::Bytes(vec![1; 9]);
        assert_eq!(item.as_u64(), Err(RlpError::IntegerOverflow(8)));
    }

    #[test]
    fn scalar_strips_leading_zeros() {
        let mut scalar = [0u8; 32];
        scalar[31] = 0x7f;
        let encoded = RlpStream::new().append_scalar(&scalar).finish();
        assert_eq!(encoded, vec![0xc1, 0x7f]);
    }
}
