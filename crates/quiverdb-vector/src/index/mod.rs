//! IVF-Flat indexing.
//!
//! An inverted-file index buckets every stored vector under its nearest
//! centroid. A search probes only the clusters whose centroids lie close
//! to the query, in ascending centroid distance, through the iterators in
//! [`iterator`].

mod iterator;
mod ivf;
mod persistence;

pub use iterator::{ClusterIter, ElementIter, ProbeEntry};
pub use ivf::{IvfFlatIndex, IvfList};
pub use persistence::{partition_count, IndexPartition};
