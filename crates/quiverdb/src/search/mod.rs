//! Search execution: exact full scan and the IVF-based ANN strategies.
//!
//! All strategies rank by the same fused distance (the weighted sum of
//! per-field squared L2 distances) and return results in ascending
//! distance order. The three approximate strategies share the IVF probe
//! iterators and a Threshold-Algorithm-style stop condition: once the sum
//! of weighted per-field distance lower bounds reaches the current k-th
//! best fused distance, no unseen record can improve the result set.

mod full_scan;
mod iterative_merge;
mod knn;
mod vbase;

pub(crate) use full_scan::full_scan;
pub(crate) use iterative_merge::knn_search_iterative_merge;
pub(crate) use knn::knn_search;
pub(crate) use vbase::knn_search_vbase;

use std::collections::BinaryHeap;

use crate::query::QueryResult;

/// Offer `result` to a max-heap holding the `k` smallest distances.
///
/// A new candidate only needs to beat the heap top (the worst retained
/// distance) once the heap is full.
pub(crate) fn push_bounded(heap: &mut BinaryHeap<QueryResult>, k: usize, result: QueryResult) {
    if heap.len() < k {
        heap.push(result);
    } else if let Some(worst) = heap.peek() {
        if result.distance < worst.distance {
            heap.pop();
            heap.push(result);
        }
    }
}
