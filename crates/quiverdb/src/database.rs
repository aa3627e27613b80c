//! Main database interface.
//!
//! This module provides the [`Database`] struct, the primary entry point
//! for `QuiverDB`.
//!
//! # Examples
//!
//! Create a database, insert hybrid records, and search:
//!
//! ```ignore
//! use quiverdb::{Database, Query, Record, ScalarType, Schema};
//!
//! let schema = Schema::new()
//!     .add_vector_field("embedding", 128, 256)?
//!     .add_scalar_field("title", ScalarType::String)?;
//! let mut db = Database::create("catalog.qdb", schema)?;
//!
//! db.set_centroids("embedding", centroids)?;
//! db.put_record(1, Record::new(1).with_scalar("intro").with_vector(vec![0.0; 128]))?;
//!
//! let query = Query::new().with_limit(10).add_vector("embedding", target);
//! let hits = db.knn_search(&query, 8)?;
//! db.close()?;
//! ```

use std::path::Path;

use tracing::{info, warn};

use quiverdb_core::{Key, Record, Schema};
use quiverdb_storage::backends::RedbEngine;
use quiverdb_vector::IvfFlatIndex;

use crate::cache::{CacheStats, RecordCache};
use crate::error::{Error, Result};
use crate::query::{Query, QueryResult};
use crate::search;
use crate::store::RecordStore;

/// Options controlling how a database is created or opened.
#[derive(Debug, Clone, Copy)]
pub struct DbOptions {
    /// Whether the database may be created. Creation requires `true`,
    /// opening an existing database requires `false`.
    pub create_if_missing: bool,
    /// Maximum number of records loaded into the cache on open.
    /// Zero disables prefetching.
    pub prefetch_records: usize,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self { create_if_missing: true, prefetch_records: 1024 }
    }
}

impl DbOptions {
    /// Create options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether the database may be created.
    #[must_use]
    pub const fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// Set the prefetch bound applied on open.
    #[must_use]
    pub const fn prefetch_records(mut self, limit: usize) -> Self {
        self.prefetch_records = limit;
        self
    }
}

/// An embedded hybrid vector-and-scalar database.
///
/// The handle owns the storage engine, one IVF-Flat index per vector
/// field, and a write-back record cache. Writes require `&mut self`;
/// searches take `&self` and may fan out across threads internally.
/// Callers must not interleave writes with searches - the cache and
/// indexes are read-shared during a search.
///
/// Dropping the handle flushes dirty records and dirty indexes
/// best-effort; call [`close`](Self::close) to observe flush errors.
pub struct Database {
    schema: Schema,
    store: RecordStore<RedbEngine>,
    cache: RecordCache,
    /// One index per vector field, in schema order.
    indexes: Vec<IvfFlatIndex>,
    /// Which indexes changed since they were last persisted.
    dirty_indexes: Vec<bool>,
    closed: bool,
}

impl Database {
    /// Create a new database at `path` with the given schema.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyExists`] if a schema is already present at
    /// the path, or a storage error if creation fails.
    pub fn create(path: impl AsRef<Path>, schema: Schema) -> Result<Self> {
        Self::create_with_options(path, schema, DbOptions::default())
    }

    /// Create a new database with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless
    /// `options.create_if_missing` is set, in addition to the errors of
    /// [`create`](Self::create).
    pub fn create_with_options(
        path: impl AsRef<Path>,
        schema: Schema,
        options: DbOptions,
    ) -> Result<Self> {
        let engine = RedbEngine::open(path)?;
        Self::create_on(engine, schema, options)
    }

    /// Create a transient in-memory database, mainly for tests.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot be created.
    pub fn in_memory(schema: Schema) -> Result<Self> {
        Self::create_on(RedbEngine::in_memory()?, schema, DbOptions::default())
    }

    fn create_on(engine: RedbEngine, schema: Schema, options: DbOptions) -> Result<Self> {
        if !options.create_if_missing {
            return Err(Error::InvalidArgument(
                "creating a database requires create_if_missing".to_owned(),
            ));
        }

        let store = RecordStore::new(engine);
        if store.has_schema()? {
            return Err(Error::AlreadyExists("database schema".to_owned()));
        }
        store.put_schema(&schema)?;

        let indexes: Vec<IvfFlatIndex> = schema
            .vector_fields
            .iter()
            .map(|field| IvfFlatIndex::new(&field.name, field.dim, field.num_centroids))
            .collect();
        let dirty_indexes = vec![false; indexes.len()];

        info!(
            vector_fields = schema.vector_fields.len(),
            scalar_fields = schema.scalar_fields.len(),
            "created database"
        );

        Ok(Self { schema, store, cache: RecordCache::new(), indexes, dirty_indexes, closed: false })
    }

    /// Open an existing database at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no schema is present, or
    /// [`Error::Corruption`] if persisted state fails to decode.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_options(path, DbOptions::default().create_if_missing(false))
    }

    /// Open an existing database with explicit options.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `options.create_if_missing`
    /// is set, in addition to the errors of [`open`](Self::open).
    pub fn open_with_options(path: impl AsRef<Path>, options: DbOptions) -> Result<Self> {
        if options.create_if_missing {
            return Err(Error::InvalidArgument(
                "opening a database requires create_if_missing = false".to_owned(),
            ));
        }

        let store = RecordStore::new(RedbEngine::open(path)?);
        let schema = store.get_schema()?;

        let mut indexes = Vec::with_capacity(schema.vector_fields.len());
        for field in &schema.vector_fields {
            let index = match store.load_index(&field.name)? {
                Some(index) => {
                    if index.dim() != field.dim || index.nlist() != field.num_centroids {
                        return Err(Error::Corruption(format!(
                            "index for field '{}' disagrees with the schema",
                            field.name
                        )));
                    }
                    index
                }
                // Never persisted (no inserts before the last close).
                None => IvfFlatIndex::new(&field.name, field.dim, field.num_centroids),
            };
            indexes.push(index);
        }
        let dirty_indexes = vec![false; indexes.len()];

        let mut cache = RecordCache::new();
        let prefetched = cache.prefetch(&store, options.prefetch_records)?;

        info!(
            vector_fields = schema.vector_fields.len(),
            scalar_fields = schema.scalar_fields.len(),
            prefetched, "opened database"
        );

        Ok(Self { schema, store, cache, indexes, dirty_indexes, closed: false })
    }

    /// The database schema.
    #[must_use]
    pub const fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Cache hit/miss counters.
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Insert or overwrite a record.
    ///
    /// The record lands in the write-back cache and in every vector
    /// field's index. Overwriting first removes the key's old index
    /// entries, so a key lives in at most one inverted list per index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the record shape does not
    /// match the schema (scalar count or types, vector count or
    /// dimensions, mismatched `record.id`), or if a vector field with
    /// clusters has no centroids installed yet.
    pub fn put_record(&mut self, key: Key, record: Record) -> Result<()> {
        self.validate_record(key, &record)?;

        let overwrite = self.cache.contains(key) || self.store.record_exists(key)?;
        if overwrite {
            for index in &mut self.indexes {
                index.delete(key);
            }
        }

        for (i, index) in self.indexes.iter_mut().enumerate() {
            index.put(key, &record.vectors[i])?;
            self.dirty_indexes[i] = true;
        }
        self.cache.put(key, record);
        Ok(())
    }

    /// Read a record by key.
    ///
    /// Served from the cache when possible, falling back to the store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown key.
    pub fn get_record(&self, key: Key) -> Result<Record> {
        self.cache.get(&self.store, key)
    }

    /// Delete a record by key.
    ///
    /// Removes the record from the cache, the store, and every index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the key is not present.
    pub fn delete_record(&mut self, key: Key) -> Result<()> {
        let present = self.cache.delete(&self.store, key)?;
        for (i, index) in self.indexes.iter_mut().enumerate() {
            if index.delete(key) {
                self.dirty_indexes[i] = true;
            }
        }
        if present {
            Ok(())
        } else {
            Err(Error::NotFound(format!("record {key}")))
        }
    }

    /// Write all dirty cached records to the store and clear the cache.
    ///
    /// # Errors
    ///
    /// Returns an error if a store write fails.
    pub fn flush_records(&mut self) -> Result<()> {
        let written = self.cache.flush(&self.store)?;
        info!(written, "flushed records");
        Ok(())
    }

    /// Install the centroids of a vector field's index.
    ///
    /// Required once per field with `num_centroids > 0` before records
    /// are inserted; existing entries are not relocated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown field or
    /// [`Error::InvalidArgument`] for a wrong centroid count or
    /// dimension.
    pub fn set_centroids(&mut self, field: &str, centroids: Vec<Vec<f32>>) -> Result<()> {
        let idx = self
            .schema
            .vector_field_index(field)
            .ok_or_else(|| Error::NotFound(format!("vector field '{field}'")))?;
        self.indexes[idx].set_centroids(centroids)?;
        self.dirty_indexes[idx] = true;
        Ok(())
    }

    /// Exact search: scan every record and return the `limit` smallest
    /// fused distances, ascending.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed query or a storage failure.
    pub fn full_scan(&self, query: &Query) -> Result<Vec<QueryResult>> {
        search::full_scan(&self.schema, &self.store, &self.cache, query)
    }

    /// Approximate search probing `nprobe` clusters per query vector,
    /// fused by the Threshold Algorithm.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed query or a storage failure.
    pub fn knn_search(&self, query: &Query, nprobe: usize) -> Result<Vec<QueryResult>> {
        search::knn_search(&self.schema, &self.indexes, &self.store, &self.cache, query, nprobe)
    }

    /// Approximate search via per-field candidate doubling, bounded by
    /// `k_threshold`.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed query or a storage failure.
    pub fn knn_search_iterative_merge(
        &self,
        query: &Query,
        nprobe: usize,
        k_threshold: usize,
    ) -> Result<Vec<QueryResult>> {
        search::knn_search_iterative_merge(
            &self.schema,
            &self.indexes,
            &self.store,
            &self.cache,
            query,
            nprobe,
            k_threshold,
        )
    }

    /// Approximate search with adaptive per-field stepping; `n2` scales
    /// how many extra steps better-scoring fields receive per round.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed query or a storage failure.
    pub fn knn_search_vbase(
        &self,
        query: &Query,
        nprobe: usize,
        n2: usize,
    ) -> Result<Vec<QueryResult>> {
        search::knn_search_vbase(
            &self.schema,
            &self.indexes,
            &self.store,
            &self.cache,
            query,
            nprobe,
            n2,
        )
    }

    /// Flush dirty records and dirty indexes, then consume the handle.
    ///
    /// Prefer this over relying on `Drop`, which can only log flush
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns an error if a flush write fails; the handle is consumed
    /// either way.
    pub fn close(mut self) -> Result<()> {
        let result = self.flush_all();
        self.closed = true;
        result
    }

    fn flush_all(&mut self) -> Result<()> {
        self.cache.flush(&self.store)?;
        for (i, index) in self.indexes.iter().enumerate() {
            if self.dirty_indexes[i] {
                self.store.put_index(index)?;
                self.dirty_indexes[i] = false;
            }
        }

        let stats = self.cache.stats();
        info!(cache_hits = stats.hits, cache_misses = stats.misses, "closed database");
        Ok(())
    }

    fn validate_record(&self, key: Key, record: &Record) -> Result<()> {
        if record.id != key {
            return Err(Error::InvalidArgument(format!(
                "record id {} does not match key {key}",
                record.id
            )));
        }
        if record.scalars.len() != self.schema.scalar_fields.len() {
            return Err(Error::InvalidArgument(format!(
                "record has {} scalars, schema declares {}",
                record.scalars.len(),
                self.schema.scalar_fields.len()
            )));
        }
        for (scalar, field) in record.scalars.iter().zip(&self.schema.scalar_fields) {
            if !field.ty.matches(scalar) {
                return Err(Error::InvalidArgument(format!(
                    "scalar field '{}' expects {:?}",
                    field.name, field.ty
                )));
            }
        }
        if record.vectors.len() != self.schema.vector_fields.len() {
            return Err(Error::InvalidArgument(format!(
                "record has {} vectors, schema declares {}",
                record.vectors.len(),
                self.schema.vector_fields.len()
            )));
        }
        for (i, (vector, field)) in
            record.vectors.iter().zip(&self.schema.vector_fields).enumerate()
        {
            if vector.len() != field.dim {
                return Err(Error::InvalidArgument(format!(
                    "vector field '{}' expects dimension {}, got {}",
                    field.name,
                    field.dim,
                    vector.len()
                )));
            }
            // Reject early so a failed put never leaves a partial index
            // insertion behind.
            if field.num_centroids > 0 && !self.indexes[i].has_centroids() {
                return Err(Error::InvalidArgument(format!(
                    "vector field '{}' has no centroids installed",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.flush_all() {
                warn!(error = %e, "flush on drop failed");
            }
        }
    }
}
