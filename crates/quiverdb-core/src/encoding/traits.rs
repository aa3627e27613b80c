//! Encoding and decoding traits for serialization.

use crate::error::CoreError;

/// A trait for types that can be encoded to bytes.
///
/// Implementations produce the framed binary envelopes described in the
/// [`encoding`](crate::encoding) module documentation.
pub trait Encoder: Sized {
    /// Encode this value to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails (e.g. an element is too long for
    /// its length prefix).
    fn encode(&self) -> Result<Vec<u8>, CoreError> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf)?;
        Ok(buf)
    }

    /// Encode this value into a pre-allocated buffer.
    ///
    /// Appends the encoded bytes to `buf`, which is more efficient when
    /// encoding multiple values.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding fails.
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError>;
}

/// A trait for types that can be decoded from bytes.
pub trait Decoder: Sized {
    /// Decode a value from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid or truncated input.
    fn decode(bytes: &[u8]) -> Result<Self, CoreError>;
}
