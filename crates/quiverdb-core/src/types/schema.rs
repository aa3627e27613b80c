//! Schema: the ordered field layout of a database.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

use super::ScalarType;

/// A dense vector field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorField {
    /// Field name, unique among vector fields.
    pub name: String,
    /// Vector dimension; always positive.
    pub dim: usize,
    /// Number of IVF centroids. Zero disables approximate search for this
    /// field; it remains searchable by full scan.
    pub num_centroids: usize,
}

/// A scalar field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarField {
    /// Field name, unique among scalar fields.
    pub name: String,
    /// The value type stored in this field.
    pub ty: ScalarType,
}

/// The ordered field layout of a database.
///
/// A schema is written exactly once when a database is created and read
/// back on open; it is immutable afterwards. The position of a field in
/// the schema equals the position of its value within a record's
/// `scalars` / `vectors` tuples.
///
/// # Example
///
/// ```ignore
/// use quiverdb_core::{ScalarType, Schema};
///
/// let schema = Schema::new()
///     .add_vector_field("embedding", 128, 256)?
///     .add_scalar_field("title", ScalarType::String)?;
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Vector field declarations in order.
    pub vector_fields: Vec<VectorField>,
    /// Scalar field declarations in order.
    pub scalar_fields: Vec<ScalarField>,
    /// Reverse lookup: vector field name to position.
    vector_field_idx: HashMap<String, usize>,
    /// Reverse lookup: scalar field name to position.
    scalar_field_idx: HashMap<String, usize>,
}

impl Schema {
    /// Create an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vector field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FieldExists`] if a vector field with this name
    /// already exists, or [`CoreError::InvalidField`] if `dim` is zero.
    pub fn add_vector_field(
        mut self,
        name: impl Into<String>,
        dim: usize,
        num_centroids: usize,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if dim == 0 {
            return Err(CoreError::InvalidField(format!(
                "vector field '{name}' must have a positive dimension"
            )));
        }
        if self.vector_field_idx.contains_key(&name) {
            return Err(CoreError::FieldExists(name));
        }

        self.vector_field_idx.insert(name.clone(), self.vector_fields.len());
        self.vector_fields.push(VectorField { name, dim, num_centroids });
        Ok(self)
    }

    /// Append a scalar field.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::FieldExists`] if a scalar field with this name
    /// already exists.
    pub fn add_scalar_field(
        mut self,
        name: impl Into<String>,
        ty: ScalarType,
    ) -> Result<Self, CoreError> {
        let name = name.into();
        if self.scalar_field_idx.contains_key(&name) {
            return Err(CoreError::FieldExists(name));
        }

        self.scalar_field_idx.insert(name.clone(), self.scalar_fields.len());
        self.scalar_fields.push(ScalarField { name, ty });
        Ok(self)
    }

    /// Position of a vector field by name.
    #[inline]
    #[must_use]
    pub fn vector_field_index(&self, name: &str) -> Option<usize> {
        self.vector_field_idx.get(name).copied()
    }

    /// Position of a scalar field by name.
    #[inline]
    #[must_use]
    pub fn scalar_field_index(&self, name: &str) -> Option<usize> {
        self.scalar_field_idx.get(name).copied()
    }

    /// Look up a vector field by name.
    #[must_use]
    pub fn vector_field(&self, name: &str) -> Option<&VectorField> {
        self.vector_field_index(name).map(|i| &self.vector_fields[i])
    }

    /// Look up a scalar field by name.
    #[must_use]
    pub fn scalar_field(&self, name: &str) -> Option<&ScalarField> {
        self.scalar_field_index(name).map(|i| &self.scalar_fields[i])
    }
}
