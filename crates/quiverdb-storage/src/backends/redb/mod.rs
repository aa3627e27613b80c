//! Redb storage backend.
//!
//! Stores the entire keyspace in a single physical redb table; the ASCII
//! namespace prefixes of the upper layers keep entries sorted into their
//! logical groups.

mod cursor;
mod engine;

pub use cursor::RedbCursor;
pub use engine::{RedbConfig, RedbEngine};
