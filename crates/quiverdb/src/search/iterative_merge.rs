//! Iterative-merge approximate search.
//!
//! Instead of fusing cluster streams directly, each round asks every
//! field for its unfiltered top-`k_cur` entries (element mode) and
//! evaluates the union of the new keys. If the per-field distance bounds
//! cannot yet prove the top-k optimal, `k_cur` doubles and another round
//! runs, bounded above by `k_threshold`.

use std::collections::{BinaryHeap, HashSet};

use quiverdb_core::{Key, Schema};
use quiverdb_storage::StorageEngine;
use quiverdb_vector::{euclidean_distance_squared, ElementIter, IvfFlatIndex};

use crate::cache::RecordCache;
use crate::error::Result;
use crate::query::{Query, QueryResult, ResolvedQuery};
use crate::store::RecordStore;

use super::push_bounded;

/// Approximate top-k via per-field candidate doubling.
pub(crate) fn knn_search_iterative_merge<E: StorageEngine>(
    schema: &Schema,
    indexes: &[IvfFlatIndex],
    store: &RecordStore<E>,
    cache: &RecordCache,
    query: &Query,
    nprobe: usize,
    k_threshold: usize,
) -> Result<Vec<QueryResult>> {
    let resolved = ResolvedQuery::resolve(schema, query)?;
    let k = resolved.limit;
    if k == 0 || resolved.vectors.is_empty() {
        return Ok(Vec::new());
    }

    let mut visited: HashSet<Key> = HashSet::new();
    let mut heap: BinaryHeap<QueryResult> = BinaryHeap::new();
    let mut thresholds = vec![f32::INFINITY; resolved.vectors.len()];
    let mut k_cur = k;

    loop {
        // Candidate generation: the top-k_cur keys of every field's
        // single-field stream, minus everything already visited.
        let mut candidates: Vec<Key> = Vec::new();
        for qv in &resolved.vectors {
            let index = &indexes[qv.field_idx];
            for entry in ElementIter::new(index, qv.target, nprobe).take(k_cur) {
                if visited.insert(entry.key) {
                    candidates.push(entry.key);
                }
            }
        }

        for key in candidates {
            let record = cache.get(store, key)?;
            if !resolved.passes_filters(&record) {
                continue;
            }
            for (threshold, qv) in thresholds.iter_mut().zip(&resolved.vectors) {
                let d = euclidean_distance_squared(qv.target, &record.vectors[qv.field_idx]);
                if d < *threshold {
                    *threshold = d;
                }
            }
            let total = resolved.fused_distance(&record);
            push_bounded(&mut heap, k, QueryResult { id: key, distance: total });
        }

        let tau: f32 = thresholds
            .iter()
            .zip(&resolved.vectors)
            .map(|(threshold, qv)| qv.weight * threshold)
            .sum();
        if heap.len() == k {
            if let Some(worst) = heap.peek() {
                if tau >= worst.distance {
                    break;
                }
            }
        }

        if k_cur >= k_threshold {
            break;
        }
        k_cur = (k_cur * 2).min(k_threshold);
    }

    Ok(heap.into_sorted_vec())
}
