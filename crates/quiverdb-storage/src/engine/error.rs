//! Storage error types.

use thiserror::Error;

/// Errors that can occur in storage operations.
///
/// This enum covers the failure modes of storage backends, from opening
/// the database to per-operation transaction and I/O errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The database could not be opened or created.
    #[error("failed to open database: {0}")]
    Open(String),

    /// A transaction failed to begin or commit.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid argument was provided (e.g. an empty key).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An internal error occurred in the storage backend.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
