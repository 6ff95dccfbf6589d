#![forbid(unsafe_code)]

//! User-facing sensitivity and its mapping onto constructor thresholds.
//!
//! Sensitivity ranges over `[-3, 3]`. Higher values tolerate more curvature
//! within a segment and need less travel to register movement:
//!
//! ```text
//! difference_threshold = 0.12 + s * (if s <= 0 { 0.03 } else { 0.1 })
//! distance_threshold   = 60 - s * 8
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::ConstructorConfig;

/// Sensitivity setting, clamped to `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Sensitivity(f64);

impl Sensitivity {
    pub const MIN: f64 = -3.0;
    pub const MAX: f64 = 3.0;

    /// Clamp into range; non-finite input maps to the neutral value 0.
    #[must_use]
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            #[cfg(feature = "tracing")]
            tracing::warn!(value, "non-finite sensitivity, using 0");
            return Self(0.0);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    #[inline]
    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn difference_threshold(self) -> f64 {
        let s = self.0;
        0.12 + s * if s <= 0.0 { 0.03 } else { 0.1 }
    }

    #[must_use]
    pub fn distance_threshold(self) -> f64 {
        60.0 - self.0 * 8.0
    }

    #[must_use]
    pub fn constructor_config(self) -> ConstructorConfig {
        ConstructorConfig::new(self.difference_threshold(), self.distance_threshold())
    }
}

impl From<f64> for Sensitivity {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Sensitivity> for f64 {
    fn from(s: Sensitivity) -> Self {
        s.0
    }
}

impl From<Sensitivity> for ConstructorConfig {
    fn from(s: Sensitivity) -> Self {
        s.constructor_config()
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.0)
    }
}
