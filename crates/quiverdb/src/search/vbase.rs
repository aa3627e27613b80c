//! VBase-style approximate search.
//!
//! Element-mode iterators advance a few entries at a time instead of a
//! cluster at a time. Step counts adapt per round: fields whose
//! candidates score better on average (smaller fused distances) receive
//! proportionally more steps, scaled by `n2`. Termination matches the
//! default strategy: stop once the weighted per-field distance bounds
//! reach the k-th best fused distance, or when every stream is dry.

use std::collections::{BinaryHeap, HashSet};

use quiverdb_core::{Key, Schema};
use quiverdb_storage::StorageEngine;
use quiverdb_vector::{ElementIter, IvfFlatIndex};

use crate::cache::RecordCache;
use crate::error::Result;
use crate::query::{Query, QueryResult, ResolvedQuery};
use crate::store::RecordStore;

use super::push_bounded;

/// Base number of entries every field consumes per round.
const K_PER_ROUND: usize = 10;

/// Per-field iteration state.
struct FieldState<'a> {
    iter: ElementIter<'a>,
    /// Minimum single-field distance yielded so far.
    threshold: f32,
    /// Sum of fused distances of candidates this field discovered.
    scores_sum: f32,
    /// Number of candidates this field discovered.
    scores_count: usize,
}

/// Step counts for the next round.
///
/// Until every field has scored at least one candidate, all fields
/// advance by the base step. Afterwards each field's share of `n2` extra
/// steps is proportional to `count / sum`, the inverse of its average
/// fused distance.
fn step_counts(fields: &[FieldState<'_>], n2: usize) -> Vec<usize> {
    if fields.iter().any(|f| f.scores_count == 0) {
        return vec![K_PER_ROUND; fields.len()];
    }

    let ratios: Vec<f64> =
        fields.iter().map(|f| f.scores_count as f64 / f64::from(f.scores_sum)).collect();
    let ratio_sum: f64 = ratios.iter().sum();

    ratios
        .iter()
        .map(|ratio| K_PER_ROUND + (n2 as f64 * ratio / ratio_sum).ceil() as usize)
        .collect()
}

/// Approximate top-k with adaptive per-field stepping.
pub(crate) fn knn_search_vbase<E: StorageEngine>(
    schema: &Schema,
    indexes: &[IvfFlatIndex],
    store: &RecordStore<E>,
    cache: &RecordCache,
    query: &Query,
    nprobe: usize,
    n2: usize,
) -> Result<Vec<QueryResult>> {
    let resolved = ResolvedQuery::resolve(schema, query)?;
    let k = resolved.limit;
    if k == 0 || resolved.vectors.is_empty() {
        return Ok(Vec::new());
    }

    let mut fields: Vec<FieldState<'_>> = resolved
        .vectors
        .iter()
        .map(|qv| FieldState {
            iter: ElementIter::new(&indexes[qv.field_idx], qv.target, nprobe),
            threshold: f32::INFINITY,
            scores_sum: 0.0,
            scores_count: 0,
        })
        .collect();

    let mut visited: HashSet<Key> = HashSet::new();
    let mut heap: BinaryHeap<QueryResult> = BinaryHeap::new();

    loop {
        let steps = step_counts(&fields, n2);
        let mut exhausted = true;

        for (field, step) in fields.iter_mut().zip(steps) {
            for _ in 0..step {
                let Some(entry) = field.iter.next() else {
                    break;
                };
                exhausted = false;

                if entry.distance < field.threshold {
                    field.threshold = entry.distance;
                }
                if !visited.insert(entry.key) {
                    continue;
                }

                let record = cache.get(store, entry.key)?;
                if !resolved.passes_filters(&record) {
                    continue;
                }
                let total = resolved.fused_distance(&record);
                field.scores_sum += total;
                field.scores_count += 1;
                push_bounded(&mut heap, k, QueryResult { id: entry.key, distance: total });
            }
        }

        let tau: f32 = fields
            .iter()
            .zip(&resolved.vectors)
            .map(|(field, qv)| qv.weight * field.threshold)
            .sum();
        if heap.len() == k {
            if let Some(worst) = heap.peek() {
                if tau >= worst.distance {
                    break;
                }
            }
        }

        if exhausted {
            break;
        }
    }

    Ok(heap.into_sorted_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_state(sum: f32, count: usize) -> FieldState<'static> {
        // A throwaway iterator over a leaked empty index keeps the test
        // focused on the step arithmetic.
        let index: &'static IvfFlatIndex = Box::leak(Box::new(IvfFlatIndex::new("f", 1, 0)));
        FieldState {
            iter: ElementIter::new(index, &[], 0),
            threshold: f32::INFINITY,
            scores_sum: sum,
            scores_count: count,
        }
    }

    #[test]
    fn warmup_rounds_use_the_base_step() {
        let fields = vec![field_state(0.0, 0), field_state(10.0, 2)];
        assert_eq!(step_counts(&fields, 100), vec![K_PER_ROUND, K_PER_ROUND]);
    }

    #[test]
    fn better_scoring_fields_get_more_steps() {
        // Field 0 averages distance 1, field 1 averages distance 10.
        let fields = vec![field_state(2.0, 2), field_state(20.0, 2)];
        let steps = step_counts(&fields, 100);
        assert!(steps[0] > steps[1]);
        assert!(steps.iter().all(|&s| s >= K_PER_ROUND));
    }
}
