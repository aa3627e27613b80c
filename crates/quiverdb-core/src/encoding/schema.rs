//! Serialization for [`Schema`] envelopes.
//!
//! A schema is encoded as:
//!
//! ```text
//! [vector field count: u32 BE]
//!   per field: [name: string] [dim: u64 BE] [num_centroids: u64 BE]
//! [scalar field count: u32 BE]
//!   per field: [name: string] [type tag: u8]
//! ```
//!
//! Decoding rebuilds the schema through the builder so the reverse lookup
//! maps are always consistent with the field order.

use crate::error::CoreError;
use crate::types::{ScalarType, Schema};

use super::traits::{Decoder, Encoder};
use super::{read_string, read_u32, read_u64, write_len, write_string};

impl Encoder for Schema {
    fn encode_to(&self, buf: &mut Vec<u8>) -> Result<(), CoreError> {
        write_len(buf, self.vector_fields.len(), "vector fields")?;
        for field in &self.vector_fields {
            write_string(buf, &field.name)?;
            buf.extend_from_slice(&(field.dim as u64).to_be_bytes());
            buf.extend_from_slice(&(field.num_centroids as u64).to_be_bytes());
        }

        write_len(buf, self.scalar_fields.len(), "scalar fields")?;
        for field in &self.scalar_fields {
            write_string(buf, &field.name)?;
            buf.push(field.ty.tag());
        }
        Ok(())
    }
}

impl Decoder for Schema {
    fn decode(bytes: &[u8]) -> Result<Self, CoreError> {
        let mut schema = Schema::new();
        let mut offset = 0;

        let vector_count = read_u32(bytes)? as usize;
        offset += 4;
        for _ in 0..vector_count {
            let (name, consumed) = read_string(&bytes[offset..])?;
            offset += consumed;
            let dim = read_u64(&bytes[offset..])? as usize;
            offset += 8;
            let num_centroids = read_u64(&bytes[offset..])? as usize;
            offset += 8;
            schema = schema.add_vector_field(name, dim, num_centroids)?;
        }

        let scalar_count = read_u32(&bytes[offset..])? as usize;
        offset += 4;
        for _ in 0..scalar_count {
            let (name, consumed) = read_string(&bytes[offset..])?;
            offset += consumed;
            let tag = *bytes
                .get(offset)
                .ok_or_else(|| CoreError::Encoding("unexpected end of input".to_owned()))?;
            offset += 1;
            let ty = ScalarType::from_tag(tag)
                .ok_or_else(|| CoreError::Encoding(format!("unknown scalar field tag: {tag:#x}")))?;
            schema = schema.add_scalar_field(name, ty)?;
        }

        Ok(schema)
    }
}
