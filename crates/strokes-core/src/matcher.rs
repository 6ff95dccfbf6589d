#![forbid(unsafe_code)]

//! Scoring a candidate pattern against registered gestures.
//!
//! # Distance
//!
//! For a candidate `c` and template `t`:
//!
//! ```text
//! n        = min(|c|, |t|)
//! distance = mean(1 - cos(c[i], t[i]) for i < n) + length_penalty * ||c| - |t||
//! ```
//!
//! Identical directions give 0. A candidate that is a strict prefix of a
//! template pays the length penalty per missing segment, so an exact-length
//! match always wins over a prefix, yet a prefix can still be accepted while
//! the stroke is in progress if the threshold allows it.
//!
//! # Selection
//!
//! Disabled gestures, gestures with the wrong finger count (when one is
//! given) and gestures whose pattern is not well formed are skipped. The
//! lowest distance wins; on ties the earliest registered gesture is kept.
//! The winner is returned only if its distance is strictly below the
//! acceptance threshold.

use serde::{Deserialize, Serialize};

use crate::geometry::dissimilarity;
use crate::gesture::Gesture;
use crate::pattern::Pattern;

/// Acceptance and scoring parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// A match must score strictly below this (default: 0.12).
    pub acceptance_threshold: f64,
    /// Added per segment of length difference (default: 0.15).
    pub length_penalty: f64,
}

impl MatcherConfig {
    pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.12;
    pub const DEFAULT_LENGTH_PENALTY: f64 = 0.15;
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: Self::DEFAULT_ACCEPTANCE_THRESHOLD,
            length_penalty: Self::DEFAULT_LENGTH_PENALTY,
        }
    }
}

/// An accepted gesture and its distance from the candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub gesture: &'a Gesture,
    pub distance: f64,
}

/// Distance between two patterns; see the module docs.
#[must_use]
pub fn pattern_distance(a: &Pattern, b: &Pattern, length_penalty: f64) -> f64 {
    let n = a.len().min(b.len());
    let shape = if n == 0 {
        0.0
    } else {
        let total: f64 = a
            .iter()
            .zip(b.iter())
            .map(|(&x, &y)| dissimilarity(x, y))
            .sum();
        total / n as f64
    };
    shape + length_penalty * a.len().abs_diff(b.len()) as f64
}

/// Best gesture for `candidate` within `config.acceptance_threshold`.
///
/// `fingers` restricts matching to gestures registered for that finger
/// count; pass `None` when the input source has no finger concept.
/// An empty candidate never matches.
pub fn closest_gesture<'a, I>(
    candidate: &Pattern,
    gestures: I,
    fingers: Option<u8>,
    config: &MatcherConfig,
) -> Option<Match<'a>>
where
    I: IntoIterator<Item = &'a Gesture>,
{
    if candidate.is_empty() {
        return None;
    }

    let mut best: Option<Match<'a>> = None;
    for gesture in gestures {
        if !gesture.enabled || !gesture.pattern.is_well_formed() {
            continue;
        }
        if fingers.is_some_and(|f| f != gesture.fingers) {
            continue;
        }
        let distance = pattern_distance(candidate, &gesture.pattern, config.length_penalty);
        // Strict comparison keeps the earliest gesture on ties.
        if best.is_none_or(|b| distance < b.distance) {
            best = Some(Match { gesture, distance });
        }
    }

    let best = best?;
    #[cfg(feature = "tracing")]
    tracing::trace!(
        id = %best.gesture.id,
        distance = best.distance,
        threshold = config.acceptance_threshold,
        "closest gesture"
    );
    (best.distance < config.acceptance_threshold).then_some(best)
}

/// Closest gesture with the default length penalty and no finger filter.
pub fn closest_gesture_by_pattern<'a, I>(
    candidate: &Pattern,
    gestures: I,
    acceptance_threshold: f64,
) -> Option<&'a Gesture>
where
    I: IntoIterator<Item = &'a Gesture>,
{
    let config = MatcherConfig {
        acceptance_threshold,
        ..MatcherConfig::default()
    };
    closest_gesture(candidate, gestures, None, &config).map(|m| m.gesture)
}
