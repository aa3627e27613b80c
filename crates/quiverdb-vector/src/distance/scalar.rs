//! Scalar (non-SIMD) distance functions.
//!
//! Fallback implementations that work on any platform. These serve as the
//! reference for validating the SIMD variants.

/// Calculate the squared Euclidean (L2) distance between two vectors.
///
/// This avoids the sqrt operation since only relative distances matter
/// for nearest-neighbor ranking.
///
/// # Panics
///
/// Debug-panics if vectors have different lengths.
#[inline]
#[must_use]
pub fn euclidean_distance_squared(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Calculate the Manhattan (L1) distance between two vectors.
///
/// # Panics
///
/// Debug-panics if vectors have different lengths.
#[inline]
#[must_use]
pub fn manhattan_distance(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn assert_near(a: f32, b: f32) {
        assert!((a - b).abs() < EPSILON, "assertion failed: {a} !~ {b}");
    }

    #[test]
    fn test_euclidean_squared() {
        let a = [0.0, 0.0];
        let b = [3.0, 4.0];
        assert_near(euclidean_distance_squared(&a, &b), 25.0);
    }

    #[test]
    fn test_euclidean_squared_identical_is_exactly_zero() {
        let a = [0.3, -1.7, 2.5];
        assert_eq!(euclidean_distance_squared(&a, &a), 0.0);
    }

    #[test]
    fn test_manhattan() {
        let a = [0.0, 0.0];
        let b = [3.0, -4.0];
        assert_near(manhattan_distance(&a, &b), 7.0);
    }
}
