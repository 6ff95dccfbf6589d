#![forbid(unsafe_code)]

//! Planar points and direction vectors.
//!
//! Coordinates are `f64` in whatever frame the pointer source reports
//! (typically viewport pixels). Nothing here holds state.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// Magnitudes below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

/// An absolute pointer coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite (no NaN or infinity).
    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other - self).magnitude()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A direction. Vectors stored in a pattern are unit length.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector {
    pub x: f64,
    pub y: f64,
}

impl Vector {
    pub const RIGHT: Self = Self::new(1.0, 0.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0);
    /// Screen coordinates: `+y` points down.
    pub const DOWN: Self = Self::new(0.0, 1.0);
    pub const UP: Self = Self::new(0.0, -1.0);

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.x.hypot(self.y)
    }

    #[inline]
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Scale to unit length.
    ///
    /// Returns `None` for zero-length or non-finite vectors, which have no
    /// direction.
    #[must_use]
    pub fn normalize(self) -> Option<Self> {
        let len = self.magnitude();
        if !len.is_finite() || len < EPSILON {
            return None;
        }
        Some(Self::new(self.x / len, self.y / len))
    }
}

impl Sub for Point {
    type Output = Vector;

    fn sub(self, rhs: Self) -> Vector {
        Vector::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector> for Point {
    type Output = Point;

    fn add(self, rhs: Vector) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

/// Cosine of the angle between two vectors, clamped to `[-1, 1]`.
///
/// Degenerate inputs (zero or non-finite magnitude) yield `0.0`, i.e.
/// "orthogonal", so they never look like a perfect match. Results within
/// [`EPSILON`] of `1` are snapped to exactly `1`, so a vector compared with
/// itself always scores a dissimilarity of exactly `0`.
#[must_use]
pub fn cosine_similarity(a: Vector, b: Vector) -> f64 {
    let ma = a.magnitude();
    let mb = b.magnitude();
    if !(ma.is_finite() && mb.is_finite()) || ma < EPSILON || mb < EPSILON {
        return 0.0;
    }
    let cos = a.dot(b) / (ma * mb);
    if cos >= 1.0 - EPSILON {
        1.0
    } else {
        cos.max(-1.0)
    }
}

/// Angular dissimilarity `1 - cos`, in `[0, 2]`.
///
/// `0` means same direction, `1` perpendicular, `2` opposite.
#[inline]
#[must_use]
pub fn dissimilarity(a: Vector, b: Vector) -> f64 {
    1.0 - cosine_similarity(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn point_difference_is_vector() {
        let v = Point::new(10.0, 4.0) - Point::new(3.0, 6.0);
        assert_eq!(v, Vector::new(7.0, -2.0));
        assert_eq!(Point::new(3.0, 6.0) + v, Point::new(10.0, 4.0));
    }

    #[test]
    fn magnitude_and_normalize() {
        let v = Vector::new(3.0, 4.0);
        assert!(close(v.magnitude(), 5.0));
        let n = v.normalize().unwrap();
        assert!(close(n.x, 0.6));
        assert!(close(n.y, 0.8));
        assert!(close(n.magnitude(), 1.0));
    }

    #[test]
    fn normalize_rejects_degenerate() {
        assert!(Vector::new(0.0, 0.0).normalize().is_none());
        assert!(Vector::new(f64::NAN, 1.0).normalize().is_none());
        assert!(Vector::new(f64::INFINITY, 0.0).normalize().is_none());
    }

    #[test]
    fn cosine_similarity_ignores_magnitude() {
        assert!(close(
            cosine_similarity(Vector::new(0.0, 240.0), Vector::DOWN),
            1.0
        ));
        assert!(close(cosine_similarity(Vector::RIGHT, Vector::DOWN), 0.0));
        assert!(close(cosine_similarity(Vector::RIGHT, Vector::LEFT), -1.0));
    }

    #[test]
    fn dissimilarity_range() {
        assert!(close(dissimilarity(Vector::UP, Vector::UP), 0.0));
        assert!(close(dissimilarity(Vector::UP, Vector::RIGHT), 1.0));
        assert!(close(dissimilarity(Vector::UP, Vector::DOWN), 2.0));
    }

    #[test]
    fn self_dissimilarity_is_exactly_zero() {
        for i in 0..3600 {
            let theta = f64::from(i).to_radians() / 10.0;
            let v = Vector::new(theta.cos() * 137.0, theta.sin() * 137.0);
            assert_eq!(dissimilarity(v, v), 0.0, "angle {theta}");
            let scaled = Vector::new(v.x * 3.0, v.y * 3.0);
            assert_eq!(cosine_similarity(v, scaled), 1.0, "angle {theta}");
        }
    }

    #[test]
    fn degenerate_vectors_count_as_orthogonal() {
        let zero = Vector::default();
        assert!(close(dissimilarity(zero, Vector::RIGHT), 1.0));
        assert!(close(dissimilarity(Vector::new(f64::NAN, 0.0), zero), 1.0));
    }

    #[test]
    fn finite_checks() {
        assert!(Point::new(1.0, 2.0).is_finite());
        assert!(!Point::new(f64::NAN, 2.0).is_finite());
        assert!(!Point::new(0.0, f64::NEG_INFINITY).is_finite());
        assert!(close(Point::new(0.0, 0.0).distance(Point::new(3.0, 4.0)), 5.0));
    }
}
