//! Redb storage engine implementation.
//!
//! This module provides the [`RedbEngine`] type which implements the
//! [`StorageEngine`] trait using the redb embedded database. Every write
//! runs in its own redb transaction, giving single-operation durability.

use std::path::Path;

use redb::{Database, TableDefinition};

use crate::engine::{StorageEngine, StorageError};

use super::cursor::RedbCursor;

/// The physical table that stores all key-value pairs.
pub(super) const DATA_TABLE: TableDefinition<'static, &[u8], &[u8]> =
    TableDefinition::new("quiver_data");

/// Configuration options for the redb storage engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedbConfig {
    /// Cache size in bytes. If not set, uses redb's default.
    pub cache_size: Option<usize>,
}

impl RedbConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache size.
    #[must_use]
    pub const fn cache_size(mut self, size: usize) -> Self {
        self.cache_size = Some(size);
        self
    }
}

/// A storage engine backed by redb.
///
/// Redb is a pure-Rust embedded database providing an ordered, durable
/// byte-keyed table, which is exactly the contract the database consumes.
///
/// # Example
///
/// ```ignore
/// use quiverdb_storage::backends::RedbEngine;
/// use quiverdb_storage::StorageEngine;
///
/// let engine = RedbEngine::open("my_database.qdb")?;
/// engine.put(b"s:", b"schema bytes")?;
/// ```
pub struct RedbEngine {
    /// The underlying redb database.
    db: Database,
}

impl RedbEngine {
    /// Open or create a database at the given path with default
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or
    /// created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        Self::open_with_config(path, RedbConfig::default())
    }

    /// Open or create a database at the given path with custom
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be opened or
    /// created.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: RedbConfig,
    ) -> Result<Self, StorageError> {
        let mut builder = Database::builder();
        if let Some(cache_size) = config.cache_size {
            builder.set_cache_size(cache_size);
        }

        let db = builder.create(path.as_ref()).map_err(|e| StorageError::Open(e.to_string()))?;
        Ok(Self { db })
    }

    /// Create an in-memory database for testing.
    ///
    /// The database is lost when the engine is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let db = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(|e| StorageError::Open(e.to_string()))?;
        Ok(Self { db })
    }

    pub(super) const fn database(&self) -> &Database {
        &self.db
    }
}

impl StorageEngine for RedbEngine {
    type Cursor<'a>
        = RedbCursor<'a>
    where
        Self: 'a;

    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        let tx =
            self.db.begin_read().map_err(|e| StorageError::Transaction(e.to_string()))?;
        match tx.open_table(DATA_TABLE) {
            Ok(table) => match table.get(key) {
                Ok(Some(value)) => Ok(Some(value.value().to_vec())),
                Ok(None) => Ok(None),
                Err(e) => Err(StorageError::Internal(e.to_string())),
            },
            // No data table means no data, which is not an error.
            Err(redb::TableError::TableDoesNotExist(_)) => Ok(None),
            Err(e) => Err(StorageError::Internal(e.to_string())),
        }
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidArgument("empty key".to_owned()));
        }

        let tx =
            self.db.begin_write().map_err(|e| StorageError::Transaction(e.to_string()))?;
        {
            let mut table =
                tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
            table.insert(key, value).map_err(|e| StorageError::Internal(e.to_string()))?;
        }
        tx.commit().map_err(|e| StorageError::Transaction(e.to_string()))
    }

    fn delete(&self, key: &[u8]) -> Result<bool, StorageError> {
        let tx =
            self.db.begin_write().map_err(|e| StorageError::Transaction(e.to_string()))?;
        let removed = {
            let mut table =
                tx.open_table(DATA_TABLE).map_err(|e| StorageError::Internal(e.to_string()))?;
            let removed = table.remove(key).map_err(|e| StorageError::Internal(e.to_string()))?.is_some();
            removed
        };
        tx.commit().map_err(|e| StorageError::Transaction(e.to_string()))?;
        Ok(removed)
    }

    fn scan_prefix(&self, prefix: &[u8]) -> Result<Self::Cursor<'_>, StorageError> {
        Ok(RedbCursor::new(self, prefix.to_vec()))
    }
}

// RedbEngine is Send + Sync because redb::Database is Send + Sync.
