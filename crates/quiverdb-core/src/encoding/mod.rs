//! Binary encoding for persisted types.
//!
//! This module provides compact framed envelopes for the core types plus
//! the byte-key layout used to address them in an ordered key-value store.
//!
//! # Format conventions
//!
//! - every variable-length element is preceded by a big-endian `u32` count
//! - integer payloads are big-endian
//! - `f32` vector payloads are little-endian for efficient memory copying
//! - tagged unions carry a single leading tag byte
//!
//! Decoding is length-checked everywhere; truncated input, unknown tags,
//! and invalid UTF-8 all surface as [`CoreError::Encoding`].

pub mod keys;
mod record;
mod scalar;
mod schema;
mod traits;

#[cfg(test)]
mod proptest_tests;

pub use scalar::{decode_scalar, decode_vector, encode_vector_to};
pub use traits::{Decoder, Encoder};

use crate::error::CoreError;

/// Take exactly `n` bytes from the front of `bytes`.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if fewer than `n` bytes remain.
pub fn take(bytes: &[u8], n: usize) -> Result<&[u8], CoreError> {
    bytes
        .get(..n)
        .ok_or_else(|| CoreError::Encoding("unexpected end of input".to_owned()))
}

/// Read a big-endian `u32` from the front of `bytes`.
pub fn read_u32(bytes: &[u8]) -> Result<u32, CoreError> {
    let raw: [u8; 4] = take(bytes, 4)?
        .try_into()
        .map_err(|_| CoreError::Encoding("failed to read u32".to_owned()))?;
    Ok(u32::from_be_bytes(raw))
}

/// Read a big-endian `u64` from the front of `bytes`.
pub fn read_u64(bytes: &[u8]) -> Result<u64, CoreError> {
    let raw: [u8; 8] = take(bytes, 8)?
        .try_into()
        .map_err(|_| CoreError::Encoding("failed to read u64".to_owned()))?;
    Ok(u64::from_be_bytes(raw))
}

/// Encode a length as a big-endian `u32`, rejecting oversized input.
pub fn write_len(buf: &mut Vec<u8>, len: usize, what: &str) -> Result<(), CoreError> {
    let len = u32::try_from(len).map_err(|_| CoreError::Encoding(format!("{what} too long")))?;
    buf.extend_from_slice(&len.to_be_bytes());
    Ok(())
}

/// Read a length-prefixed UTF-8 string, returning it and the bytes consumed.
pub fn read_string(bytes: &[u8]) -> Result<(String, usize), CoreError> {
    let len = read_u32(bytes)? as usize;
    let raw = take(&bytes[4..], len)?;
    let s = String::from_utf8(raw.to_vec())
        .map_err(|e| CoreError::Encoding(format!("invalid UTF-8: {e}")))?;
    Ok((s, 4 + len))
}

/// Write a length-prefixed UTF-8 string.
pub fn write_string(buf: &mut Vec<u8>, s: &str) -> Result<(), CoreError> {
    write_len(buf, s.len(), "string")?;
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}
