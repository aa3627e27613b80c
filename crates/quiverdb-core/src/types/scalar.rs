//! Scalar attribute values stored on records.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A typed scalar attribute value.
///
/// Equality and ordering are defined only between values of the same tag:
/// numeric values use natural order, strings compare lexicographically.
/// Cross-tag comparisons are never equal and never ordered, so every
/// ordering operator evaluates to `false` across tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// 64-bit floating point value.
    Double(f64),
    /// 64-bit signed integer value.
    Int(i64),
    /// UTF-8 string value.
    String(String),
}

impl Scalar {
    /// The type tag of this value.
    #[inline]
    #[must_use]
    pub const fn scalar_type(&self) -> ScalarType {
        match self {
            Self::Double(_) => ScalarType::Double,
            Self::Int(_) => ScalarType::Int,
            Self::String(_) => ScalarType::String,
        }
    }

    /// Returns the value as a double if it is one.
    #[inline]
    #[must_use]
    pub const fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the value as an integer if it is one.
    #[inline]
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a string slice if it is one.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialOrd for Scalar {
    /// Same-tag comparison only; cross-tag comparisons return `None`.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Double(a), Self::Double(b)) => a.partial_cmp(b),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<f64> for Scalar {
    #[inline]
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl From<i64> for Scalar {
    #[inline]
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<String> for Scalar {
    #[inline]
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for Scalar {
    #[inline]
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

/// The type of a scalar field.
///
/// The discriminants are stable and double as the on-disk type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ScalarType {
    /// 64-bit floating point.
    Double = 0,
    /// 64-bit signed integer.
    Int = 1,
    /// UTF-8 string.
    String = 2,
}

impl ScalarType {
    /// The on-disk tag byte for this type.
    #[inline]
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Decode a type from its tag byte.
    #[inline]
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Double),
            1 => Some(Self::Int),
            2 => Some(Self::String),
            _ => None,
        }
    }

    /// Check whether a value carries this type's tag.
    #[inline]
    #[must_use]
    pub fn matches(self, value: &Scalar) -> bool {
        value.scalar_type() == self
    }
}
