//! `QuiverDB` Storage
//!
//! This crate provides the ordered key-value storage abstraction and the
//! redb backend implementation for `QuiverDB`.
//!
//! # Overview
//!
//! The database persists everything - schema, records, index partitions -
//! as opaque binary envelopes in a single sorted byte keyspace. The
//! [`StorageEngine`] trait captures exactly what the upper layers consume:
//! point get, point put, point delete, and ascending prefix iteration.
//! Each write is durable on its own; multi-operation transactions are
//! intentionally out of scope.
//!
//! # Core Traits
//!
//! - [`StorageEngine`] - the main entry point for storage operations
//! - [`Cursor`] - forward-only ordered iteration over key-value pairs
//!
//! # Example
//!
//! ```ignore
//! use quiverdb_storage::backends::RedbEngine;
//! use quiverdb_storage::StorageEngine;
//!
//! let engine = RedbEngine::open("my_database.qdb")?;
//! engine.put(b"r:1", b"value")?;
//! assert_eq!(engine.get(b"r:1")?, Some(b"value".to_vec()));
//! ```

pub mod backends;
pub mod engine;

pub use engine::{Cursor, CursorResult, KeyValue, StorageEngine, StorageError, StorageResult};
