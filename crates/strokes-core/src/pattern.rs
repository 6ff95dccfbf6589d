#![forbid(unsafe_code)]

//! Streaming reduction of pointer samples into direction patterns.
//!
//! [`PatternConstructor`] consumes raw [`Point`]s one at a time and keeps only
//! the committed direction segments. A segment is appended when the pointer
//! turns by more than `difference_threshold` (measured as `1 - cos`); while the
//! pointer keeps roughly the same heading, the last segment is re-aimed from
//! the start of its stroke to the newest sample.
//!
//! # Invariants
//!
//! 1. A [`Pattern`] built here never contains a zero-length or non-finite
//!    vector; every stored vector is unit length.
//! 2. Samples closer than `distance_threshold` to the current anchor leave
//!    the state untouched.
//! 3. After [`clear`](PatternConstructor::clear) the constructor is
//!    indistinguishable from a freshly created one with the same config.
//!
//! Each sample is handled in O(1); raw coordinates are not retained beyond
//! the anchor and the current stroke origin.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Vector, dissimilarity};

// ---------------------------------------------------------------------------
// Pattern
// ---------------------------------------------------------------------------

/// Ordered sequence of direction vectors describing a stroke shape.
///
/// Serializes as `{ "data": [{ "x": .., "y": .. }, ..] }`. Stored templates
/// loaded from the wire are not required to be unit length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pattern {
    data: Vec<Vector>,
}

impl Pattern {
    /// Create a pattern from raw vectors (as stored in a gesture template).
    #[must_use]
    pub fn new(data: Vec<Vector>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Vector] {
        &self.data
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Vector> {
        self.data.iter()
    }

    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<Vector> {
        self.data.last().copied()
    }

    /// Non-empty, with every vector finite and of non-zero length.
    ///
    /// Patterns failing this check are never considered by the matcher.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        !self.data.is_empty() && self.data.iter().all(|v| v.normalize().is_some())
    }

    fn clear(&mut self) {
        self.data.clear();
    }

    fn push(&mut self, v: Vector) {
        self.data.push(v);
    }

    fn set_last(&mut self, v: Vector) {
        if let Some(last) = self.data.last_mut() {
            *last = v;
        }
    }
}

impl FromIterator<Vector> for Pattern {
    fn from_iter<I: IntoIterator<Item = Vector>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Pattern {
    type Item = &'a Vector;
    type IntoIter = std::slice::Iter<'a, Vector>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Thresholds fixed for the lifetime of a [`PatternConstructor`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstructorConfig {
    /// Maximum `1 - cos` (0–2) for a sample to continue the current segment
    /// (default: 0.12).
    pub difference_threshold: f64,
    /// Minimum displacement from the anchor for a sample to count as
    /// movement (default: 60.0).
    pub distance_threshold: f64,
}

impl ConstructorConfig {
    pub const DEFAULT_DIFFERENCE_THRESHOLD: f64 = 0.12;
    pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 60.0;

    #[must_use]
    pub const fn new(difference_threshold: f64, distance_threshold: f64) -> Self {
        Self {
            difference_threshold,
            distance_threshold,
        }
    }
}

impl Default for ConstructorConfig {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_DIFFERENCE_THRESHOLD,
            Self::DEFAULT_DISTANCE_THRESHOLD,
        )
    }
}

// ---------------------------------------------------------------------------
// PatternConstructor
// ---------------------------------------------------------------------------

/// Incremental converter from pointer samples to a [`Pattern`].
///
/// One instance serves one capture session at a time; call
/// [`clear`](Self::clear) at session end to reuse it.
#[derive(Debug, Clone)]
pub struct PatternConstructor {
    config: ConstructorConfig,
    anchor: Option<Point>,
    // Origin of the segment currently at the end of `pattern`.
    stroke_start: Point,
    pattern: Pattern,
}

impl PatternConstructor {
    #[must_use]
    pub fn new(config: ConstructorConfig) -> Self {
        Self {
            config,
            anchor: None,
            stroke_start: Point::default(),
            pattern: Pattern::new(Vec::with_capacity(8)),
        }
    }

    /// Feed one pointer sample, returning the number of committed segments.
    ///
    /// The first sample of a session only establishes the anchor and returns
    /// 0. Non-finite samples and samples within `distance_threshold` of the
    /// anchor are ignored. A sample heading the same way as the last segment
    /// re-aims that segment without changing the count; otherwise a new
    /// segment is appended.
    pub fn add_point(&mut self, p: Point) -> usize {
        if !p.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::trace!(x = p.x, y = p.y, "ignoring non-finite sample");
            return self.pattern.len();
        }

        let Some(anchor) = self.anchor else {
            self.anchor = Some(p);
            return 0;
        };

        let delta = p - anchor;
        if delta.magnitude() < self.config.distance_threshold {
            return self.pattern.len();
        }
        let Some(v) = delta.normalize() else {
            return self.pattern.len();
        };

        match self.pattern.last() {
            None => {
                self.pattern.push(v);
                self.stroke_start = anchor;
            }
            Some(last) if dissimilarity(v, last) < self.config.difference_threshold => {
                // Same heading: refine the segment from its origin.
                if let Some(refined) = (p - self.stroke_start).normalize() {
                    self.pattern.set_last(refined);
                }
            }
            Some(_) => {
                self.pattern.push(v);
                self.stroke_start = anchor;
                #[cfg(feature = "tracing")]
                tracing::trace!(
                    segments = self.pattern.len(),
                    dx = v.x,
                    dy = v.y,
                    "stroke turned"
                );
            }
        }

        self.anchor = Some(p);
        self.pattern.len()
    }

    /// Borrow the pattern built so far.
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Owned copy of the pattern built so far.
    #[must_use]
    pub fn snapshot(&self) -> Pattern {
        self.pattern.clone()
    }

    /// Number of committed segments.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.pattern.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Last sample that registered as movement, if any.
    #[inline]
    #[must_use]
    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ConstructorConfig {
        &self.config
    }

    /// Forget the anchor and all segments. Keeps the allocation.
    pub fn clear(&mut self) {
        self.anchor = None;
        self.stroke_start = Point::default();
        self.pattern.clear();
    }
}

impl Default for PatternConstructor {
    fn default() -> Self {
        Self::new(ConstructorConfig::default())
    }
}
