//! Batched streaming cursor for the redb backend.
//!
//! The cursor avoids materializing whole prefixes in memory: it fetches
//! entries in fixed-size batches, each from a fresh read transaction, and
//! re-seeks past the last returned key for the next batch. At any time it
//! holds at most one batch of entries.

use std::ops::Bound;

use crate::engine::{Cursor, CursorResult, KeyValue, StorageError};

use super::engine::{RedbEngine, DATA_TABLE};

/// Maximum number of entries fetched per batch.
const BATCH_SIZE: usize = 1024;

/// A forward-only prefix cursor over the redb backend.
pub struct RedbCursor<'a> {
    /// The engine, used to begin a read transaction per batch.
    engine: &'a RedbEngine,
    /// The scanned key prefix.
    prefix: Vec<u8>,
    /// First key past the prefix range; `None` when the prefix is empty
    /// or has no successor.
    end: Option<Vec<u8>>,
    /// Remaining entries of the current batch.
    batch: std::vec::IntoIter<KeyValue>,
    /// The last key handed out, for re-seeking the next batch.
    last_key: Option<Vec<u8>>,
    /// Whether the current batch was the final one.
    finished: bool,
}

impl<'a> RedbCursor<'a> {
    pub(super) fn new(engine: &'a RedbEngine, prefix: Vec<u8>) -> Self {
        let end = prefix_successor(&prefix);
        Self { engine, prefix, end, batch: Vec::new().into_iter(), last_key: None, finished: false }
    }

    /// Fetch the next batch, starting after the last returned key.
    fn fetch_batch(&self) -> Result<Vec<KeyValue>, StorageError> {
        let tx = self
            .engine
            .database()
            .begin_read()
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        let table = match tx.open_table(DATA_TABLE) {
            Ok(table) => table,
            // No data table means no data, which is not an error.
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Internal(e.to_string())),
        };

        let lower = match &self.last_key {
            Some(key) => Bound::Excluded(key.as_slice()),
            None => Bound::Included(self.prefix.as_slice()),
        };
        let upper = match &self.end {
            Some(end) => Bound::Excluded(end.as_slice()),
            None => Bound::Unbounded,
        };

        let range = table
            .range::<&[u8]>((lower, upper))
            .map_err(|e| StorageError::Internal(e.to_string()))?;

        let mut entries = Vec::with_capacity(BATCH_SIZE.min(64));
        for result in range {
            if entries.len() >= BATCH_SIZE {
                break;
            }
            let (key, value) = result.map_err(|e| StorageError::Internal(e.to_string()))?;
            entries.push((key.value().to_vec(), value.value().to_vec()));
        }
        Ok(entries)
    }
}

impl Cursor for RedbCursor<'_> {
    fn next(&mut self) -> CursorResult {
        if let Some((key, value)) = self.batch.next() {
            self.last_key = Some(key.clone());
            return Ok(Some((key, value)));
        }

        if self.finished {
            return Ok(None);
        }

        let entries = self.fetch_batch()?;
        self.finished = entries.len() < BATCH_SIZE;
        self.batch = entries.into_iter();

        match self.batch.next() {
            Some((key, value)) => {
                self.last_key = Some(key.clone());
                Ok(Some((key, value)))
            }
            None => Ok(None),
        }
    }
}

/// The smallest key greater than every key carrying `prefix`.
///
/// Returns `None` when no such key exists (empty prefix or all `0xFF`),
/// in which case the scan is unbounded above.
fn prefix_successor(prefix: &[u8]) -> Option<Vec<u8>> {
    let mut end = prefix.to_vec();
    while let Some(last) = end.last_mut() {
        if *last == u8::MAX {
            end.pop();
        } else {
            *last += 1;
            return Some(end);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StorageEngine;

    fn collect(engine: &RedbEngine, prefix: &[u8]) -> Vec<KeyValue> {
        let mut cursor = engine.scan_prefix(prefix).expect("cursor");
        let mut entries = Vec::new();
        while let Some(entry) = cursor.next().expect("next") {
            entries.push(entry);
        }
        entries
    }

    #[test]
    fn prefix_successor_increments_last_byte() {
        assert_eq!(prefix_successor(b"r:"), Some(b"r;".to_vec()));
        assert_eq!(prefix_successor(&[0x01, 0xFF]), Some(vec![0x02]));
        assert_eq!(prefix_successor(&[0xFF, 0xFF]), None);
        assert_eq!(prefix_successor(b""), None);
    }

    #[test]
    fn scan_returns_only_prefixed_keys_in_order() {
        let engine = RedbEngine::in_memory().expect("in-memory db");
        engine.put(b"i:vec:0", b"index").expect("put");
        engine.put(b"r:10", b"ten").expect("put");
        engine.put(b"r:2", b"two").expect("put");
        engine.put(b"s:", b"schema").expect("put");

        let entries = collect(&engine, b"r:");
        // Ascending byte order: "r:10" < "r:2".
        assert_eq!(
            entries,
            vec![(b"r:10".to_vec(), b"ten".to_vec()), (b"r:2".to_vec(), b"two".to_vec())]
        );
    }

    #[test]
    fn scan_empty_prefix_sees_everything() {
        let engine = RedbEngine::in_memory().expect("in-memory db");
        engine.put(b"a", b"1").expect("put");
        engine.put(b"z", b"2").expect("put");

        assert_eq!(collect(&engine, b"").len(), 2);
    }

    #[test]
    fn scan_streams_across_batches() {
        let engine = RedbEngine::in_memory().expect("in-memory db");
        let n = BATCH_SIZE * 2 + 17;
        for i in 0..n {
            engine.put(format!("k:{i:08}").as_bytes(), b"v").expect("put");
        }

        let entries = collect(&engine, b"k:");
        assert_eq!(entries.len(), n);
        assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn scan_on_empty_database_is_empty() {
        let engine = RedbEngine::in_memory().expect("in-memory db");
        assert!(collect(&engine, b"r:").is_empty());
    }
}
