//! Core storage engine traits.
//!
//! This module defines the contract the database consumes from its
//! backing store:
//!
//! - [`StorageEngine`] - point get/put/delete plus prefix iteration
//! - [`Cursor`] - forward-only ordered iteration over key-value pairs
//!
//! The traits use an associated cursor type so backends can stream
//! results without boxing.

use std::sync::Arc;

use super::StorageError;

/// A key-value pair returned by cursor operations.
pub type KeyValue = (Vec<u8>, Vec<u8>);

/// Result type for cursor operations that return a key-value pair.
pub type CursorResult = Result<Option<KeyValue>, StorageError>;

/// An ordered byte-keyed store.
///
/// Every operation is durable on its own; the engine offers no
/// multi-operation transactions. Implementations must be thread-safe
/// (`Send + Sync`); the database layers a single-writer contract on top,
/// so concurrent readers only ever run while no write is in flight.
pub trait StorageEngine: Send + Sync {
    /// The cursor type for prefix iteration.
    type Cursor<'a>: Cursor
    where
        Self: 'a;

    /// Get the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any existing value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidArgument`] for an empty key, or an
    /// error if the write fails.
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;

    /// Delete the value stored under `key`.
    ///
    /// Returns `Ok(true)` if the key was present, `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete(&self, key: &[u8]) -> Result<bool, StorageError>;

    /// Create a cursor over all entries whose key starts with `prefix`,
    /// in ascending key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be created.
    fn scan_prefix(&self, prefix: &[u8]) -> Result<Self::Cursor<'_>, StorageError>;
}

/// A forward-only cursor over key-value pairs in ascending key order.
///
/// # Iteration Pattern
///
/// ```ignore
/// let mut cursor = engine.scan_prefix(b"r:")?;
/// while let Some((key, value)) = cursor.next()? {
///     // process the entry
/// }
/// ```
pub trait Cursor {
    /// Move to the next key-value pair.
    ///
    /// Returns `None` once the prefix range is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn next(&mut self) -> CursorResult;
}

/// Implement `StorageEngine` for `Arc<E>` to allow shared ownership of
/// engines across components.
impl<E: StorageEngine> StorageEngine for Arc<E> {
    type Cursor<'a>
        = E::Cursor<'a>
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        (**self).put(key, value)
    }

    fn delete(&self, key: &[u8]) -> Result<bool, StorageError> {
        (**self).delete(key)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Self::Cursor<'_>, StorageError> {
        (**self).scan_prefix(prefix)
    }
}
