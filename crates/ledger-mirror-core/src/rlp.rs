//! Recursive Length Prefix encoding.
//!
//! Only the encoder is implemented: the mirror builds transactions but never
//! parses them. Rules:
//! - A single byte below `0x80` is its own encoding
//! - Strings up to 55 bytes: `0x80 + len`, then the bytes
//! - Longer strings: `0xb7 + len(len)`, big-endian length, then the bytes
//! - Lists use the same scheme with `0xc0` / `0xf7`
//! - Integers are big-endian with no leading zero bytes; zero is the empty string

use bytes::{BufMut, Bytes, BytesMut};

const STRING_OFFSET: u8 = 0x80;
const LIST_OFFSET: u8 = 0xc0;
const SHORT_LIMIT: usize = 55;

/// Builder for one RLP list.
///
/// Items are appended in order; [`RlpList::finish`] prefixes the payload
/// with the list header.
#[derive(Debug, Default)]
pub struct RlpList {
    payload: BytesMut,
}

impl RlpList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a byte string.
    pub fn append_bytes(&mut self, data: &[u8]) -> &mut Self {
        encode_bytes(&mut self.payload, data);
        self
    }

    /// Append an unsigned integer.
    pub fn append_u64(&mut self, value: u64) -> &mut Self {
        self.append_uint_be(&value.to_be_bytes())
    }

    /// Append an unsigned integer.
    pub fn append_u128(&mut self, value: u128) -> &mut Self {
        self.append_uint_be(&value.to_be_bytes())
    }

    /// Append an unsigned big-endian integer of any width. Leading zero
    /// bytes are stripped.
    pub fn append_uint_be(&mut self, be: &[u8]) -> &mut Self {
        encode_bytes(&mut self.payload, trim_leading_zeros(be));
        self
    }

    /// Append an already-encoded item verbatim.
    pub fn append_raw(&mut self, encoded: &[u8]) -> &mut Self {
        self.payload.put_slice(encoded);
        self
    }

    /// Close the list and return its full encoding.
    pub fn finish(&self) -> Bytes {
        let mut out = BytesMut::with_capacity(self.payload.len() + 9);
        encode_header(&mut out, LIST_OFFSET, self.payload.len());
        out.put_slice(&self.payload);
        out.freeze()
    }
}

/// Encode a single byte string.
pub fn encode_bytes(out: &mut BytesMut, data: &[u8]) {
    if data.len() == 1 && data[0] < STRING_OFFSET {
        out.put_u8(data[0]);
        return;
    }
    encode_header(out, STRING_OFFSET, data.len());
    out.put_slice(data);
}

fn encode_header(out: &mut BytesMut, offset: u8, len: usize) {
    if len <= SHORT_LIMIT {
        out.put_u8(offset + len as u8);
    } else {
        let len_bytes = (len as u64).to_be_bytes();
        let len_be = trim_leading_zeros(&len_bytes);
        out.put_u8(offset + SHORT_LIMIT as u8 + len_be.len() as u8);
        out.put_slice(len_be);
    }
}

fn trim_leading_zeros(be: &[u8]) -> &[u8] {
    let start = be.iter().position(|b| *b != 0).unwrap_or(be.len());
    &be[start..]
}
