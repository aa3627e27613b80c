//! `QuiverDB` Vector
//!
//! Distance kernels and IVF-Flat indexing for `QuiverDB`.
//!
//! # Overview
//!
//! Approximate search buckets every vector under its nearest centroid
//! ("inverted file" indexing); a query probes the few clusters whose
//! centroids lie closest. This crate provides:
//!
//! - [`distance`] - squared-L2 and L1 kernels, SIMD and scalar variants
//! - [`index`] - the [`IvfFlatIndex`] with probe-ordered iterators and a
//!   partitioned persistence envelope
//!
//! Centroid training is out of scope: callers supply centroids produced
//! by an external k-means pass via [`IvfFlatIndex::set_centroids`].

pub mod distance;
pub mod error;
pub mod index;

pub use distance::{euclidean_distance_squared, manhattan_distance};
pub use error::VectorError;
pub use index::{
    ClusterIter, ElementIter, IndexPartition, IvfFlatIndex, IvfList, ProbeEntry,
};
