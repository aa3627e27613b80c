//! Typed persistence layer over the storage engine.
//!
//! Maps the binary envelopes of schema, records, and index partitions
//! onto the ordered keyspace described in
//! [`quiverdb_core::encoding::keys`]. This layer owns no domain
//! invariants beyond faithful round-trips; anything that fails to decode
//! surfaces as [`Error::Corruption`].

use quiverdb_core::encoding::keys;
use quiverdb_core::{Decoder, Encoder, Key, Record, Schema};
use quiverdb_storage::{Cursor, StorageEngine};
use quiverdb_vector::index::partition_count;
use quiverdb_vector::{IndexPartition, IvfFlatIndex};

use crate::error::{Error, Result};

/// Envelope-aware view of a storage engine.
pub struct RecordStore<E: StorageEngine> {
    engine: E,
}

impl<E: StorageEngine> RecordStore<E> {
    /// Wrap a storage engine.
    pub const fn new(engine: E) -> Self {
        Self { engine }
    }

    /// Whether a schema envelope is present.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn has_schema(&self) -> Result<bool> {
        Ok(self.engine.get(keys::SCHEMA_KEY)?.is_some())
    }

    /// Write the schema envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    pub fn put_schema(&self, schema: &Schema) -> Result<()> {
        let encoded = schema.encode()?;
        self.engine.put(keys::SCHEMA_KEY, &encoded)?;
        Ok(())
    }

    /// Read the schema envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if no schema has been written, or
    /// [`Error::Corruption`] if the envelope fails to decode.
    pub fn get_schema(&self) -> Result<Schema> {
        let bytes = self
            .engine
            .get(keys::SCHEMA_KEY)?
            .ok_or_else(|| Error::NotFound("schema".to_owned()))?;
        Ok(Schema::decode(&bytes)?)
    }

    /// Write a record envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    pub fn put_record(&self, key: Key, record: &Record) -> Result<()> {
        let encoded = record.encode()?;
        self.engine.put(&keys::record_key(key), &encoded)?;
        Ok(())
    }

    /// Read a record envelope.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] for an unknown key, or
    /// [`Error::Corruption`] if the envelope fails to decode.
    pub fn get_record(&self, key: Key) -> Result<Record> {
        let bytes = self
            .engine
            .get(&keys::record_key(key))?
            .ok_or_else(|| Error::NotFound(format!("record {key}")))?;
        Ok(Record::decode(&bytes)?)
    }

    /// Whether a record is present in the store.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub fn record_exists(&self, key: Key) -> Result<bool> {
        Ok(self.engine.get(&keys::record_key(key))?.is_some())
    }

    /// Delete a record. Returns `true` if it was present.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete_record(&self, key: Key) -> Result<bool> {
        Ok(self.engine.delete(&keys::record_key(key))?)
    }

    /// Persist an index as its deterministic set of partitions.
    ///
    /// The partition count depends only on the index shape `(nlist, dim)`,
    /// which the immutable schema fixes for the life of the database, so
    /// partitions are always overwritten in place.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or a write fails.
    pub fn put_index(&self, index: &IvfFlatIndex) -> Result<()> {
        for (i, partition) in IndexPartition::split(index).into_iter().enumerate() {
            let encoded = partition.encode()?;
            self.engine.put(&keys::index_partition_key(index.field_name(), i), &encoded)?;
        }
        Ok(())
    }

    /// Load an index from its partitions.
    ///
    /// Partition 0 supplies the `(field_name, dim, nlist)` metadata from
    /// which the remaining partition keys are derived. Returns `Ok(None)`
    /// if the field has never been persisted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] if a partition is missing, fails to
    /// decode, or disagrees with the others on metadata.
    pub fn load_index(&self, field: &str) -> Result<Option<IvfFlatIndex>> {
        let Some(bytes) = self.engine.get(&keys::index_partition_key(field, 0))? else {
            return Ok(None);
        };
        let first = IndexPartition::decode(&bytes)?;
        let n_partitions = partition_count(first.nlist, first.dim);

        let mut partitions = Vec::with_capacity(n_partitions);
        partitions.push(first);
        for i in 1..n_partitions {
            let bytes = self
                .engine
                .get(&keys::index_partition_key(field, i))?
                .ok_or_else(|| {
                    Error::Corruption(format!("missing index partition {i} for field '{field}'"))
                })?;
            partitions.push(IndexPartition::decode(&bytes)?);
        }

        Ok(Some(IndexPartition::assemble(partitions)?))
    }

    /// Stream all records in the store, in key order.
    ///
    /// # Errors
    ///
    /// Returns an error if the cursor cannot be created.
    pub fn scan_records(&self) -> Result<RecordScan<E::Cursor<'_>>> {
        Ok(RecordScan { cursor: self.engine.scan_prefix(keys::RECORD_PREFIX)? })
    }
}

/// Streaming iterator over persisted records.
pub struct RecordScan<C: Cursor> {
    cursor: C,
}

impl<C: Cursor> RecordScan<C> {
    /// Decode the next record, or `None` when the prefix is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corruption`] for a malformed key or envelope.
    pub fn next(&mut self) -> Result<Option<(Key, Record)>> {
        let Some((raw_key, value)) = self.cursor.next()? else {
            return Ok(None);
        };
        let key = keys::parse_record_key(&raw_key).ok_or_else(|| {
            Error::Corruption(format!("malformed record key: {}", String::from_utf8_lossy(&raw_key)))
        })?;
        let record = Record::decode(&value)?;
        Ok(Some((key, record)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiverdb_core::ScalarType;
    use quiverdb_storage::backends::RedbEngine;

    fn store() -> RecordStore<RedbEngine> {
        RecordStore::new(RedbEngine::in_memory().expect("in-memory engine"))
    }

    fn sample_schema() -> Schema {
        Schema::new()
            .add_vector_field("vec", 2, 4)
            .expect("vector field")
            .add_scalar_field("name", ScalarType::String)
            .expect("scalar field")
    }

    #[test]
    fn schema_roundtrip() {
        let store = store();
        assert!(!store.has_schema().expect("has_schema"));

        let schema = sample_schema();
        store.put_schema(&schema).expect("put");
        assert!(store.has_schema().expect("has_schema"));
        assert_eq!(store.get_schema().expect("get"), schema);
    }

    #[test]
    fn missing_schema_is_not_found() {
        assert!(matches!(store().get_schema(), Err(Error::NotFound(_))));
    }

    #[test]
    fn record_roundtrip_and_delete() {
        let store = store();
        let record = Record::new(5).with_scalar("x").with_vector(vec![1.0, 2.0]);

        store.put_record(5, &record).expect("put");
        assert_eq!(store.get_record(5).expect("get"), record);
        assert!(store.record_exists(5).expect("exists"));

        assert!(store.delete_record(5).expect("delete"));
        assert!(!store.delete_record(5).expect("redelete"));
        assert!(matches!(store.get_record(5), Err(Error::NotFound(_))));
    }

    #[test]
    fn scan_streams_records_with_parsed_keys() {
        let store = store();
        for key in [3u64, 14, 159] {
            store
                .put_record(key, &Record::new(key).with_vector(vec![key as f32, 0.0]))
                .expect("put");
        }

        let mut scan = store.scan_records().expect("scan");
        let mut seen = Vec::new();
        while let Some((key, record)) = scan.next().expect("next") {
            assert_eq!(record.id, key);
            seen.push(key);
        }
        seen.sort_unstable();
        assert_eq!(seen, vec![3, 14, 159]);
    }

    #[test]
    fn index_roundtrip_through_partitions() {
        let store = store();
        let mut index = IvfFlatIndex::new("vec", 2, 4);
        index
            .set_centroids(vec![
                vec![0.0, 0.0],
                vec![0.0, 1.0],
                vec![1.0, 0.0],
                vec![1.0, 1.0],
            ])
            .expect("centroids");
        for key in 0..16u64 {
            index.put(key, &[(key % 4) as f32, 0.5]).expect("put");
        }

        store.put_index(&index).expect("put index");
        let loaded = store.load_index("vec").expect("load").expect("present");
        assert_eq!(loaded.centroids(), index.centroids());
        assert_eq!(loaded.inverted_lists(), index.inverted_lists());
    }

    #[test]
    fn absent_index_loads_as_none() {
        assert!(store().load_index("vec").expect("load").is_none());
    }

    #[test]
    fn corrupt_record_envelope_surfaces_as_corruption() {
        let engine = RedbEngine::in_memory().expect("engine");
        use quiverdb_storage::StorageEngine as _;
        engine.put(b"r:1", b"\xFF\xFF").expect("raw put");

        let store = RecordStore::new(engine);
        assert!(matches!(store.get_record(1), Err(Error::Corruption(_))));
    }
}
