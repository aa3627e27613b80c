//! Exact top-k by brute force.

use std::collections::BinaryHeap;

use quiverdb_core::Schema;
use quiverdb_storage::StorageEngine;

use crate::cache::RecordCache;
use crate::error::Result;
use crate::query::{Query, QueryResult, ResolvedQuery};
use crate::store::RecordStore;

use super::push_bounded;

/// Exact search: evaluate every record and keep the `limit` smallest
/// fused distances.
///
/// The cache is scanned first so write-back records that have not been
/// flushed yet are visible; the store scan then skips any key the cache
/// already served.
pub(crate) fn full_scan<E: StorageEngine>(
    schema: &Schema,
    store: &RecordStore<E>,
    cache: &RecordCache,
    query: &Query,
) -> Result<Vec<QueryResult>> {
    let resolved = ResolvedQuery::resolve(schema, query)?;
    if resolved.limit == 0 {
        return Ok(Vec::new());
    }

    let mut heap = BinaryHeap::new();

    for (key, record) in cache.cached() {
        if !resolved.passes_filters(record) {
            continue;
        }
        let distance = resolved.fused_distance(record);
        push_bounded(&mut heap, resolved.limit, QueryResult { id: key, distance });
    }

    let mut scan = store.scan_records()?;
    while let Some((key, record)) = scan.next()? {
        if cache.contains(key) {
            continue;
        }
        if !resolved.passes_filters(&record) {
            continue;
        }
        let distance = resolved.fused_distance(&record);
        push_bounded(&mut heap, resolved.limit, QueryResult { id: key, distance });
    }

    Ok(heap.into_sorted_vec())
}
