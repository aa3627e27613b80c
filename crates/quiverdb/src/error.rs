//! The crate-level error type.

use quiverdb_core::CoreError;
use quiverdb_storage::StorageError;
use quiverdb_vector::VectorError;
use thiserror::Error;

/// Errors returned by database operations.
#[derive(Debug, Error)]
pub enum Error {
    /// An unknown key or field was requested.
    #[error("not found: {0}")]
    NotFound(String),

    /// A schema or database element with this name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// A malformed argument was rejected at the call site.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The storage engine failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Persisted state could not be decoded or is internally inconsistent.
    ///
    /// Fatal to the containing database handle; other handles in the
    /// process are unaffected.
    #[error("corruption: {0}")]
    Corruption(String),

    /// A search worker panicked while holding a shared lock.
    #[error("lock poisoned by a panicked search worker")]
    LockPoisoned,
}

impl From<CoreError> for Error {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::Encoding(msg) => Self::Corruption(msg),
            CoreError::FieldExists(name) => Self::AlreadyExists(name),
            CoreError::FieldNotFound(name) => Self::NotFound(name),
            CoreError::InvalidField(msg) => Self::InvalidArgument(msg),
        }
    }
}

impl From<VectorError> for Error {
    fn from(e: VectorError) -> Self {
        match e {
            VectorError::Encoding(msg) => Self::Corruption(msg),
            other => Self::InvalidArgument(other.to_string()),
        }
    }
}

/// Result type alias for database operations.
pub type Result<T> = std::result::Result<T, Error>;
