//! Serialization for [`Record`] envelopes.
//!
//! A record is encoded as:
//!
//! ```text
//! [id: u64 BE]
//! [scalar count: u32 BE] [scalar envelope]...
//! [vector count: u32 BE] [vector envelope]...
//! ```

use crate::error::CoreError;
use crate::types::Record;

use super::scalar::{decode_scalar, decode_vector, encode_vector_to};
use super::traits::{Decoder, Encoder};
use super::{read_u32, read_u64, write_len};

impl Encoder for Record {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        buf.extend_from_slice(&self.id.to_be_bytes());

        write_len(buf, self.scalars.len(), "scalar tuple")?;
        for scalar in &self.scalars {
            scalar.encode_to(buf)?;
        }

        write_len(buf, self.vectors.len(), "vector tuple")?;
        for vector in &self.vectors {
            encode_vector_to(vector, buf)?;
        }
        Ok(())
    }
}

impl Decoder for Record {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let id = read_u64(bytes)?;
        let mut offset = 8;

        let scalar_count = read_u32(&bytes[offset..])? as usize;
        offset += 4;
        let mut scalars = Vec::with_capacity(scalar_count);
        for _ in 0..scalar_count {
            let (scalar, consumed) = decode_scalar(&bytes[offset..])?;
            scalars.push(scalar);
            offset += consumed;
        }

        let vector_count = read_u32(&bytes[offset..])? as usize;
        offset += 4;
        let mut vectors = Vec::with_capacity(vector_count);
        for _ in 0..vector_count {
            let (vector, consumed) = decode_vector(&bytes[offset..])?;
            vectors.push(vector);
            offset += consumed;
        }

        Ok(Self { id, scalars, vectors })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Scalar;

    #[test]
    fn encode_decode_full_record() {
        let original = Record::new(42)
            .with_scalar("Alice")
            .with_scalar(30i64)
            .with_scalar(1.75f64)
            .with_vector(vec![0.1, 0.2, 0.3])
            .with_vector(vec![1.0, 2.0, 3.0, 4.0]);

        let decoded = Record::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn encode_decode_scalar_only_record() {
        let original = Record::new(0).with_scalar(Scalar::Int(-5));
        let decoded = Record::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn encode_decode_empty_record() {
        let original = Record::new(u64::MAX);
        let decoded = Record::decode(&original.encode().unwrap()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn decode_truncated_record_fails() {
        let encoded = Record::new(1).with_scalar(7i64).encode().unwrap();
        assert!(Record::decode(&encoded[..encoded.len() - 1]).is_err());
        assert!(Record::decode(&encoded[..4]).is_err());
    }
}
