//! `QuiverDB`
//!
//! An embedded hybrid vector-and-scalar database. A record carries a
//! stable `u64` key, typed scalar attributes, and one dense `f32` vector
//! per declared vector field. Searches combine vector proximity with
//! scalar predicates:
//!
//! - [`Database::full_scan`] - exact brute-force top-k
//! - [`Database::knn_search`] - IVF-Flat probing fused by the Threshold
//!   Algorithm (with a single-vector fast path)
//! - [`Database::knn_search_iterative_merge`] - per-field candidate
//!   doubling
//! - [`Database::knn_search_vbase`] - adaptive per-field stepping
//!
//! Multi-vector queries rank candidates by the weighted sum of per-field
//! squared L2 distances and return the globally smallest `limit` results
//! in ascending distance order.
//!
//! Persistence maps framed binary envelopes onto an ordered byte-keyed
//! store (redb); a write-back record cache fronts the store on the hot
//! search path and is flushed on [`Database::close`].
//!
//! # Example
//!
//! ```ignore
//! use quiverdb::{Database, FilterOp, Query, Record, ScalarType, Schema};
//!
//! let schema = Schema::new()
//!     .add_vector_field("embedding", 2, 4)?
//!     .add_scalar_field("category", ScalarType::String)?;
//!
//! let mut db = Database::create("demo.qdb", schema)?;
//! db.set_centroids("embedding", centroids)?;
//! db.put_record(1, Record::new(1).with_scalar("news").with_vector(vec![0.1, 0.9]))?;
//!
//! let query = Query::new()
//!     .with_limit(5)
//!     .add_vector("embedding", vec![0.0, 1.0])
//!     .add_filter("category", FilterOp::Eq, "news");
//! for hit in db.knn_search(&query, 2)? {
//!     println!("{} at {}", hit.id, hit.distance);
//! }
//! db.close()?;
//! ```

mod cache;
mod database;
mod error;
mod query;
mod search;
mod store;

pub use cache::{CacheStats, RecordCache};
pub use database::{Database, DbOptions};
pub use error::{Error, Result};
pub use query::{FilterOp, Query, QueryResult, QueryVector, ScalarFilter};
pub use store::{RecordScan, RecordStore};

pub use quiverdb_core::{Key, Record, Scalar, ScalarField, ScalarType, Schema, VectorField};
pub use quiverdb_storage::{backends, StorageEngine};
pub use quiverdb_vector::{IvfFlatIndex, VectorError};
