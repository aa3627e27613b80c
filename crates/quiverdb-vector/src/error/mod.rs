//! Error types for the vector crate.

use thiserror::Error;

/// Errors that can occur in vector index operations.
#[derive(Debug, Error)]
pub enum VectorError {
    /// Dimension mismatch between a vector and the index.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The expected dimension.
        expected: usize,
        /// The actual dimension.
        actual: usize,
    },

    /// The number of centroids does not match the index's cluster count.
    #[error("centroid count mismatch: expected {expected}, got {actual}")]
    CentroidCount {
        /// The expected number of centroids.
        expected: usize,
        /// The actual number of centroids.
        actual: usize,
    },

    /// A vector was inserted before centroids were supplied.
    #[error("centroids not set for field '{0}'")]
    CentroidsNotSet(String),

    /// Encoding/decoding error in the index envelope.
    #[error("encoding error: {0}")]
    Encoding(String),
}
