//! Vector distance kernels.
//!
//! These functions are the inner loops of every search path and are
//! allocation-free. The [`simd`] module processes 8 floats at a time via
//! the `wide` crate and is re-exported as the default; the [`scalar`]
//! module provides the reference implementations used for validation and
//! on platforms where SIMD brings nothing.
//!
//! Both variants agree up to floating-point associativity rounding; NaN
//! values propagate per IEEE-754 with no special handling.

pub mod scalar;
pub mod simd;

pub use simd::{euclidean_distance_squared, manhattan_distance};
