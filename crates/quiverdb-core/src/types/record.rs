//! Records: the unit of storage and retrieval.

use serde::{Deserialize, Serialize};

use super::{Key, Scalar};

/// A single record: a key plus ordered scalar and vector tuples.
///
/// The position of each scalar matches the schema's scalar field order and
/// the position of each vector matches the schema's vector field order.
/// Every vector's length must equal the declared dimension of its field;
/// the database facade validates this on insert.
///
/// # Example
///
/// ```ignore
/// use quiverdb_core::Record;
///
/// let record = Record::new(7)
///     .with_scalar("Alice")
///     .with_scalar(30i64)
///     .with_vector(vec![0.1, 0.2, 0.3]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// The unique key of this record.
    pub id: Key,
    /// Scalar values, one per schema scalar field, in declaration order.
    pub scalars: Vec<Scalar>,
    /// Dense vectors, one per schema vector field, in declaration order.
    pub vectors: Vec<Vec<f32>>,
}

impl Record {
    /// Create an empty record with the given key.
    #[must_use]
    pub const fn new(id: Key) -> Self {
        Self { id, scalars: Vec::new(), vectors: Vec::new() }
    }

    /// Append a scalar value.
    #[must_use]
    pub fn with_scalar(mut self, scalar: impl Into<Scalar>) -> Self {
        self.scalars.push(scalar.into());
        self
    }

    /// Append a vector value.
    #[must_use]
    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vectors.push(vector);
        self
    }
}
