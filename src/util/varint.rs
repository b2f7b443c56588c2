//! Variable-length integer encoding utilities.
//!
//! LEB128-style encoding used for postings: small values (document deltas,
//! term frequencies, position deltas) take a single byte.

use crate::error::{MarqueeError, Result};

/// Append the variable-length encoding of `value` to `out`.
pub fn encode_u64(value: u64, out: &mut Vec<u8>) {
    let mut val = value;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80; // continuation bit
        }

        out.push(byte);

        if val == 0 {
            break;
        }
    }
}

/// Decode a value from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed.
pub fn decode_u64(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;
    let mut bytes_read = 0;

    for &byte in bytes {
        bytes_read += 1;

        if shift >= 64 {
            return Err(MarqueeError::storage("varint overflow"));
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok((result, bytes_read));
        }

        shift += 7;
    }

    Err(MarqueeError::storage("incomplete varint"))
}
