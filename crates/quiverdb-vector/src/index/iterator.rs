//! Probe-ordered iterators over an IVF-Flat index.
//!
//! Both iterators visit the `nprobe` clusters nearest to the query, in
//! ascending centroid distance:
//!
//! - [`ElementIter`] yields individual entries; within each probed
//!   cluster entries come out in ascending distance to the query via an
//!   internal min-heap, and clusters are concatenated in probe order.
//! - [`ClusterIter`] yields whole inverted lists without reordering,
//!   letting the caller parallelize within a cluster.
//!
//! Iterators borrow the index; the borrow checker enforces that they
//! cannot outlive it. Empty clusters are skipped silently, and `nprobe`
//! is clamped to the cluster count.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use quiverdb_core::Key;

use crate::distance::euclidean_distance_squared;

use super::ivf::{IvfFlatIndex, IvfList};

/// One entry yielded by [`ElementIter`].
#[derive(Debug, Clone, Copy)]
pub struct ProbeEntry<'a> {
    /// The record key.
    pub key: Key,
    /// The stored vector.
    pub vector: &'a [f32],
    /// Squared L2 distance between the stored vector and the query.
    pub distance: f32,
}

/// Compute the probe order: the `nprobe` centroids nearest to `query`,
/// ascending by (distance, centroid index).
///
/// Uses a partial sort: only the `nprobe` smallest are selected and
/// ordered.
fn probe_order(index: &IvfFlatIndex, query: &[f32], nprobe: usize) -> Vec<usize> {
    let nprobe = nprobe.min(index.nlist());
    if nprobe == 0 || !index.has_centroids() {
        return Vec::new();
    }

    fn by_distance(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
        a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1))
    }

    let mut distances: Vec<(f32, usize)> = index
        .centroids()
        .iter()
        .enumerate()
        .map(|(i, centroid)| (euclidean_distance_squared(centroid, query), i))
        .collect();

    if nprobe < distances.len() {
        distances.select_nth_unstable_by(nprobe - 1, by_distance);
        distances.truncate(nprobe);
    }
    distances.sort_unstable_by(by_distance);

    distances.into_iter().map(|(_, i)| i).collect()
}

/// Heap entry for within-cluster ordering.
struct Candidate<'a> {
    distance: f32,
    key: Key,
    vector: &'a [f32],
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.distance == other.distance
    }
}

impl Eq for Candidate<'_> {}

impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN distances are treated as equal to keep a total order; valid
        // distance calculations never produce them.
        self.distance.partial_cmp(&other.distance).unwrap_or(Ordering::Equal)
    }
}

/// Element-mode probe iterator.
///
/// Yields `(key, vector, distance)` entries cluster by cluster in probe
/// order, each cluster internally sorted by ascending query distance.
pub struct ElementIter<'a> {
    index: &'a IvfFlatIndex,
    query: &'a [f32],
    probe_order: Vec<usize>,
    next_probe: usize,
    heap: BinaryHeap<Reverse<Candidate<'a>>>,
}

impl<'a> ElementIter<'a> {
    /// Build the iterator and select the probe set.
    #[must_use]
    pub fn new(index: &'a IvfFlatIndex, query: &'a [f32], nprobe: usize) -> Self {
        let probe_order = probe_order(index, query, nprobe);
        Self { index, query, probe_order, next_probe: 0, heap: BinaryHeap::new() }
    }

    /// Load clusters into the heap until one yields entries or the probe
    /// set is exhausted.
    fn refill(&mut self) {
        while self.heap.is_empty() && self.next_probe < self.probe_order.len() {
            let cluster = &self.index.inverted_lists()[self.probe_order[self.next_probe]];
            self.next_probe += 1;
            for (key, vector) in cluster {
                self.heap.push(Reverse(Candidate {
                    distance: euclidean_distance_squared(self.query, vector),
                    key: *key,
                    vector: vector.as_slice(),
                }));
            }
        }
    }
}

impl<'a> Iterator for ElementIter<'a> {
    type Item = ProbeEntry<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.heap.is_empty() {
            self.refill();
        }
        let Reverse(candidate) = self.heap.pop()?;
        Some(ProbeEntry {
            key: candidate.key,
            vector: candidate.vector,
            distance: candidate.distance,
        })
    }
}

/// Cluster-mode probe iterator.
///
/// Yields whole inverted lists in probe order, skipping empty clusters.
pub struct ClusterIter<'a> {
    index: &'a IvfFlatIndex,
    probe_order: Vec<usize>,
    next_probe: usize,
}

impl<'a> ClusterIter<'a> {
    /// Build the iterator and select the probe set.
    #[must_use]
    pub fn new(index: &'a IvfFlatIndex, query: &[f32], nprobe: usize) -> Self {
        let probe_order = probe_order(index, query, nprobe);
        Self { index, probe_order, next_probe: 0 }
    }
}

impl<'a> Iterator for ClusterIter<'a> {
    type Item = &'a IvfList;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_probe < self.probe_order.len() {
            let cluster = &self.index.inverted_lists()[self.probe_order[self.next_probe]];
            self.next_probe += 1;
            if !cluster.is_empty() {
                return Some(cluster);
            }
        }
        None
    }
}
