//! Core data model types.

mod record;
mod scalar;
mod schema;

pub use record::Record;
pub use scalar::{Scalar, ScalarType};
pub use schema::{ScalarField, Schema, VectorField};

/// The stable identifier of a record.
pub type Key = u64;
