//! Error types for the core crate.

use thiserror::Error;

/// Errors that can occur in the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An encoding or decoding error occurred.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A field with the same name already exists in the schema.
    #[error("field already exists: {0}")]
    FieldExists(String),

    /// A field was looked up by a name the schema does not contain.
    #[error("field not found: {0}")]
    FieldNotFound(String),

    /// A field definition is invalid (e.g. zero dimension).
    #[error("invalid field: {0}")]
    InvalidField(String),
}
