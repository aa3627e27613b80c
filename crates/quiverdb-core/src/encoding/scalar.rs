//! Serialization for [`Scalar`] values and dense `f32` vectors.
//!
//! A scalar is a 1-byte type tag (the [`ScalarType`] discriminant) followed
//! by its payload:
//!
//! - `Double`: 8 bytes (IEEE 754 f64, big-endian)
//! - `Int`: 8 bytes (big-endian i64)
//! - `String`: 4 bytes length + UTF-8 bytes
//!
//! A vector is a 4-byte count followed by `count` little-endian `f32`
//! values.

use crate::error::CoreError;
use crate::types::{Scalar, ScalarType};

use super::traits::{Decoder, Encoder};
use super::{read_u32, take, write_len, write_string};

impl Encoder for Scalar {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.push(self.scalar_type().tag());
        match self {
            Self::Double(d) => buf.extend_from_slice(&d.to_be_bytes()),
            Self::Int(i) => buf.extend_from_slice(&i.to_be_bytes()),
            Self::String(s) => write_string(buf, s)?,
        }
        Ok(())
    }
}

impl Decoder for Scalar {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let (scalar, _) = decode_scalar(bytes)?;
        Ok(scalar)
    }
}

/// Decode a scalar and return the number of bytes consumed.
///
/// This is the building block for decoding scalar sequences, where the
/// caller needs to know where each value ends.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on truncated input or an unknown tag.
pub fn decode_scalar(bytes: &[u8]) -> Result<(Scalar, usize), CoreError> {
    let tag = *bytes
        .first()
        .ok_or_else(|| CoreError::Encoding("unexpected end of input".to_owned()))?;
    let rest = &bytes[1..];

    match ScalarType::from_tag(tag) {
        Some(ScalarType::Double) => {
            let raw: [u8; 8] = take(rest, 8)?
                .try_into()
                .map_err(|_| CoreError::Encoding("failed to read f64".to_owned()))?;
            Ok((Scalar::Double(f64::from_be_bytes(raw)), 9))
        }
        Some(ScalarType::Int) => {
            let raw: [u8; 8] = take(rest, 8)?
                .try_into()
                .map_err(|_| CoreError::Encoding("failed to read i64".to_owned()))?;
            Ok((Scalar::Int(i64::from_be_bytes(raw)), 9))
        }
        Some(ScalarType::String) => {
            let (s, consumed) = super::read_string(rest)?;
            Ok((Scalar::String(s), 1 + consumed))
        }
        None => Err(CoreError::Encoding(format!("unknown scalar tag: {tag:#x}"))),
    }
}

/// Append the envelope of a dense `f32` vector to `buf`.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] if the vector is too long for its
/// length prefix.
pub fn encode_vector_to(vector: &[f32], buf: &mut Vec<u8>) -> Result<(), CoreError> {
    write_len(buf, vector.len(), "vector")?;
    for v in vector {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    Ok(())
}

/// Decode a dense `f32` vector, returning it and the bytes consumed.
///
/// # Errors
///
/// Returns [`CoreError::Encoding`] on truncated input.
pub fn decode_vector(bytes: &[u8]) -> Result<(Vec<f32>, usize), CoreError> {
    let count = read_u32(bytes)? as usize;
    let payload = take(&bytes[4..], count * 4)?;
    let mut vector = Vec::with_capacity(count);
    for chunk in payload.chunks_exact(4) {
        let raw: [u8; 4] = chunk
            .try_into()
            .map_err(|_| CoreError::Encoding("failed to read f32".to_owned()))?;
        vector.push(f32::from_le_bytes(raw));
    }
    Ok((vector, 4 + count * 4))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_double() {
        for d in [0.0f64, -1.5, f64::MAX, f64::INFINITY] {
            let original = Scalar::Double(d);
            let decoded = Scalar::decode(&original.encode().unwrap()).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn encode_decode_int() {
        for i in [0i64, 1, -1, i64::MIN, i64::MAX] {
            let original = Scalar::Int(i);
            let decoded = Scalar::decode(&original.encode().unwrap()).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn encode_decode_string() {
        for s in ["", "hello", "\u{1F980}"] {
            let original = Scalar::String(s.to_owned());
            let decoded = Scalar::decode(&original.encode().unwrap()).unwrap();
            assert_eq!(decoded, original);
        }
    }

    #[test]
    fn scalar_tags_match_field_types() {
        assert_eq!(Scalar::Double(0.0).encode().unwrap()[0], 0);
        assert_eq!(Scalar::Int(0).encode().unwrap()[0], 1);
        assert_eq!(Scalar::String(String::new()).encode().unwrap()[0], 2);
    }

    #[test]
    fn encode_decode_vector() {
        for v in [vec![], vec![0.0f32], vec![0.1, -0.2, 0.3]] {
            let mut buf = Vec::new();
            encode_vector_to(&v, &mut buf).unwrap();
            let (decoded, consumed) = decode_vector(&buf).unwrap();
            assert_eq!(decoded, v);
            assert_eq!(consumed, buf.len());
        }
    }

    #[test]
    fn decode_unknown_tag_fails() {
        assert!(Scalar::decode(&[0xFF]).is_err());
    }

    #[test]
    fn decode_truncated_input_fails() {
        assert!(Scalar::decode(&[]).is_err());
        assert!(Scalar::decode(&[1, 0, 0]).is_err());
        assert!(decode_vector(&[0, 0, 0, 2, 0, 0]).is_err());
    }
}
