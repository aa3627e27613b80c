//! `QuiverDB` Core
//!
//! Core data model and binary encoding for `QuiverDB`, an embedded hybrid
//! vector-and-scalar database.
//!
//! # Overview
//!
//! A record carries a stable `u64` key, an ordered tuple of scalar
//! attributes (double, int, or string), and an ordered tuple of dense
//! `f32` vectors, one per vector field declared in the [`Schema`]. This
//! crate defines those types plus the framed binary envelopes and key
//! layout used to persist them in an ordered byte-keyed store.
//!
//! # Modules
//!
//! - [`types`] - [`Record`], [`Scalar`], [`Schema`] and field definitions
//! - [`encoding`] - binary envelopes and storage key layout
//! - [`error`] - the [`CoreError`] type

pub mod encoding;
pub mod error;
pub mod types;

pub use encoding::{Decoder, Encoder};
pub use error::CoreError;
pub use types::{Key, Record, Scalar, ScalarField, ScalarType, Schema, VectorField};
