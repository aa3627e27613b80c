//! Write-back record cache.
//!
//! A process-local `Key -> Record` map sitting in front of the store.
//! Writes land in the cache and are marked dirty; they reach the store
//! when [`RecordCache::flush`] runs (normally on close). Reads serve from
//! the cache and fall back to the store on a miss without populating the
//! cache - the prefetch path is the only backfill. Deletes write through.
//!
//! Writers are single-threaded by contract; search workers may read the
//! cache concurrently while no writer is active, which is why the hit and
//! miss counters are atomics.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use quiverdb_core::{Key, Record};
use quiverdb_storage::StorageEngine;

use crate::error::Result;
use crate::store::RecordStore;

/// Cache observability counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Reads served from the cache.
    pub hits: u64,
    /// Reads that fell through to the store.
    pub misses: u64,
}

/// Write-back cache of records keyed by record key.
#[derive(Debug, Default)]
pub struct RecordCache {
    records: HashMap<Key, Record>,
    dirty: HashSet<Key>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RecordCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether `key` is cached.
    #[must_use]
    pub fn contains(&self, key: Key) -> bool {
        self.records.contains_key(&key)
    }

    /// Iterate over the cached entries.
    pub fn cached(&self) -> impl Iterator<Item = (Key, &Record)> {
        self.records.iter().map(|(k, r)| (*k, r))
    }

    /// Hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Insert a record and mark it dirty. Does not touch the store.
    pub fn put(&mut self, key: Key, record: Record) {
        self.records.insert(key, record);
        self.dirty.insert(key);
    }

    /// Read a record, serving from the cache when possible.
    ///
    /// A miss loads from the store but does not populate the cache.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`](crate::Error::NotFound) if the key is
    /// in neither the cache nor the store.
    pub fn get<E: StorageEngine>(&self, store: &RecordStore<E>, key: Key) -> Result<Record> {
        if let Some(record) = self.records.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(record.clone());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        store.get_record(key)
    }

    /// Delete a record from the cache and the store (write-through).
    ///
    /// Returns `true` if the key was present in either place.
    ///
    /// # Errors
    ///
    /// Returns an error if the store delete fails.
    pub fn delete<E: StorageEngine>(&mut self, store: &RecordStore<E>, key: Key) -> Result<bool> {
        let in_cache = self.records.remove(&key).is_some();
        self.dirty.remove(&key);
        let in_store = store.delete_record(key)?;
        Ok(in_cache || in_store)
    }

    /// Load up to `limit` records that are not already cached.
    ///
    /// Prefetched entries are clean: they are served on read but never
    /// written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn prefetch<E: StorageEngine>(
        &mut self,
        store: &RecordStore<E>,
        limit: usize,
    ) -> Result<usize> {
        if limit == 0 {
            return Ok(0);
        }

        let mut loaded = 0;
        let mut scan = store.scan_records()?;
        while let Some((key, record)) = scan.next()? {
            if self.records.contains_key(&key) {
                continue;
            }
            self.records.insert(key, record);
            loaded += 1;
            if loaded >= limit {
                break;
            }
        }
        Ok(loaded)
    }

    /// Write every dirty record back to the store, then drop the whole
    /// cache contents and the dirty set. Returns the number written.
    ///
    /// # Errors
    ///
    /// Returns an error if a store write fails; in that case the cache is
    /// left untouched so the flush can be retried.
    pub fn flush<E: StorageEngine>(&mut self, store: &RecordStore<E>) -> Result<usize> {
        for key in &self.dirty {
            // Dirty keys are always backed by a cached record.
            if let Some(record) = self.records.get(key) {
                store.put_record(*key, record)?;
            }
        }
        let written = self.dirty.len();
        self.dirty.clear();
        self.records.clear();
        Ok(written)
    }
}
