//! Default approximate search: IVF probing fused by the Threshold
//! Algorithm.
//!
//! One cluster-mode iterator per query vector walks its index in
//! ascending centroid distance. Each round visits every iterator's
//! current cluster (in query declaration order) and processes the
//! cluster's entries in parallel. Per iterator, the smallest single-field
//! distance observed so far is a lower bound on what any unseen record
//! can score on that field; once the weighted sum of those bounds reaches
//! the k-th best fused distance, the current top-k is provably optimal
//! over the remaining clusters and the search stops.

use std::collections::{BinaryHeap, HashSet};
use std::sync::Mutex;

use rayon::prelude::*;

use quiverdb_core::{Key, Schema};
use quiverdb_storage::StorageEngine;
use quiverdb_vector::{euclidean_distance_squared, ClusterIter, ElementIter, IvfFlatIndex};

use crate::cache::RecordCache;
use crate::error::{Error, Result};
use crate::query::{Query, QueryResult, ResolvedQuery};
use crate::store::RecordStore;

use super::push_bounded;

/// Approximate top-k search over the per-field IVF indexes.
pub(crate) fn knn_search<E: StorageEngine>(
    schema: &Schema,
    indexes: &[IvfFlatIndex],
    store: &RecordStore<E>,
    cache: &RecordCache,
    query: &Query,
    nprobe: usize,
) -> Result<Vec<QueryResult>> {
    let resolved = ResolvedQuery::resolve(schema, query)?;
    if resolved.limit == 0 || resolved.vectors.is_empty() {
        return Ok(Vec::new());
    }

    if resolved.vectors.len() == 1 && indexes[resolved.vectors[0].field_idx].nlist() > 0 {
        return single_vector_search(indexes, store, cache, &resolved, nprobe);
    }

    multi_vector_search(indexes, store, cache, &resolved, nprobe)
}

/// Fast path for a single query vector: element-mode iteration.
///
/// The iterator visits each stored entry at most once, so no visited set
/// is needed. The weighted distance makes results interchangeable with a
/// full scan of the same query.
fn single_vector_search<E: StorageEngine>(
    indexes: &[IvfFlatIndex],
    store: &RecordStore<E>,
    cache: &RecordCache,
    resolved: &ResolvedQuery<'_>,
    nprobe: usize,
) -> Result<Vec<QueryResult>> {
    let qv = &resolved.vectors[0];
    let index = &indexes[qv.field_idx];
    let mut heap = BinaryHeap::new();

    for entry in ElementIter::new(index, qv.target, nprobe) {
        if !resolved.filters.is_empty() {
            let record = cache.get(store, entry.key)?;
            if !resolved.passes_filters(&record) {
                continue;
            }
        }
        let distance = qv.weight * entry.distance;
        push_bounded(&mut heap, resolved.limit, QueryResult { id: entry.key, distance });
    }

    Ok(heap.into_sorted_vec())
}

/// One per-field iterator of the fusion loop.
struct FieldProbe<'a> {
    target: &'a [f32],
    weight: f32,
    clusters: ClusterIter<'a>,
    /// Minimum single-field distance observed in any traversed cluster.
    /// Monotone non-increasing; serialized by its own mutex.
    last_seen: Mutex<f32>,
}

/// The Threshold-Algorithm fusion loop over cluster-mode iterators.
fn multi_vector_search<E: StorageEngine>(
    indexes: &[IvfFlatIndex],
    store: &RecordStore<E>,
    cache: &RecordCache,
    resolved: &ResolvedQuery<'_>,
    nprobe: usize,
) -> Result<Vec<QueryResult>> {
    let k = resolved.limit;

    let mut probes: Vec<FieldProbe<'_>> = resolved
        .vectors
        .iter()
        .map(|qv| FieldProbe {
            target: qv.target,
            weight: qv.weight,
            clusters: ClusterIter::new(&indexes[qv.field_idx], qv.target, nprobe),
            last_seen: Mutex::new(f32::INFINITY),
        })
        .collect();

    let visited: Mutex<HashSet<Key>> = Mutex::new(HashSet::new());
    let heap: Mutex<BinaryHeap<QueryResult>> = Mutex::new(BinaryHeap::new());

    loop {
        let mut exhausted = true;

        // One round: each iterator contributes its current cluster, in
        // query declaration order.
        for probe in &mut probes {
            let Some(cluster) = probe.clusters.next() else {
                continue;
            };
            exhausted = false;
            let probe = &*probe;

            // Lock order inside the closure is fixed (visited, then the
            // probe's last_seen, then the heap), so the three domains
            // cannot deadlock.
            cluster.par_iter().try_for_each(|(key, vector)| -> Result<()> {
                let distance = euclidean_distance_squared(probe.target, vector);

                {
                    let mut visited = visited.lock().map_err(|_| Error::LockPoisoned)?;
                    if !visited.insert(*key) {
                        return Ok(());
                    }
                }

                let record = cache.get(store, *key)?;
                if !resolved.passes_filters(&record) {
                    return Ok(());
                }
                let total = resolved.fused_distance(&record);

                {
                    let mut last_seen =
                        probe.last_seen.lock().map_err(|_| Error::LockPoisoned)?;
                    if distance < *last_seen {
                        *last_seen = distance;
                    }
                }

                let mut heap = heap.lock().map_err(|_| Error::LockPoisoned)?;
                push_bounded(&mut heap, k, QueryResult { id: *key, distance: total });
                Ok(())
            })?;
        }

        {
            let heap = heap.lock().map_err(|_| Error::LockPoisoned)?;
            if heap.len() == k {
                let mut tau = 0.0f32;
                for probe in &probes {
                    let last_seen =
                        probe.last_seen.lock().map_err(|_| Error::LockPoisoned)?;
                    tau += probe.weight * *last_seen;
                }
                if let Some(worst) = heap.peek() {
                    if tau >= worst.distance {
                        break;
                    }
                }
            }
        }

        if exhausted {
            break;
        }
    }

    let heap = heap.into_inner().map_err(|_| Error::LockPoisoned)?;
    Ok(heap.into_sorted_vec())
}
