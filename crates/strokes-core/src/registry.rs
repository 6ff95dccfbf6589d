#![forbid(unsafe_code)]

//! The set of configured gestures a capture session matches against.
//!
//! A [`GestureRegistry`] is immutable once built and cheap to clone, so a
//! session can hold a snapshot while the host prepares a replacement.
//! Iteration order is registration order, which is also the matcher's
//! tie-break order.
//!
//! Registries arrive either as a bare JSON array of gestures or wrapped in
//! the host's response envelope:
//!
//! ```json
//! { "gestures": [ { "id": "close", "fingers": 1, "enabled": true,
//!                   "action": { "tab_close": true },
//!                   "pattern": { "data": [ { "x": 0, "y": 240 } ] } } ] }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{self, Error, Result};
use crate::geometry::Vector;
use crate::gesture::{Action, Gesture};
use crate::pattern::Pattern;

/// Host response carrying the gesture list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetGestureResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gestures: Option<Vec<Gesture>>,
}

/// Ordered, shareable collection of gestures with unique ids.
#[derive(Debug, Clone, Default)]
pub struct GestureRegistry {
    gestures: Arc<[Gesture]>,
}

impl GestureRegistry {
    /// A registry with no gestures. Always yields no match.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a registry, rejecting duplicate ids and zero finger counts.
    pub fn from_gestures(gestures: Vec<Gesture>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(gestures.len());
        for g in &gestures {
            if !seen.insert(g.id.as_str()) {
                return Err(Error::DuplicateId { id: g.id.clone() });
            }
            if g.fingers == 0 {
                return Err(Error::InvalidFingers {
                    id: g.id.clone(),
                    fingers: g.fingers,
                });
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            count = gestures.len(),
            malformed = gestures.iter().filter(|g| !g.pattern.is_well_formed()).count(),
            "gesture registry loaded"
        );

        Ok(Self {
            gestures: gestures.into(),
        })
    }

    /// Unwrap a host response; a reported error becomes [`Error::Host`].
    pub fn from_response(response: GetGestureResponse) -> Result<Self> {
        if let Some(message) = response.error {
            return Err(Error::Host { message });
        }
        Self::from_gestures(response.gestures.unwrap_or_default())
    }

    /// Parse either a bare gesture array or a [`GetGestureResponse`].
    ///
    /// The document kind is picked from its first byte so that a malformed
    /// gesture reports its own error and position.
    pub fn from_json_str(s: &str) -> Result<Self> {
        if s.trim_start().starts_with('[') {
            Self::from_gestures(serde_json::from_str(s)?)
        } else {
            Self::from_response(serde_json::from_str(s)?)
        }
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = error::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Serialize as a bare JSON array.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&*self.gestures)?)
    }

    /// Debug fixture: close, close all, and reload.
    #[must_use]
    pub fn demo() -> Self {
        let down = Vector::new(0.0, 240.0);
        let right = Vector::new(240.0, 0.0);
        let up = Vector::new(0.0, -240.0);
        let left = Vector::new(-240.0, 0.0);
        Self {
            gestures: vec![
                Gesture::new("close", Action::TabClose, Pattern::new(vec![down, right])),
                Gesture::new(
                    "close all",
                    Action::TabCloseAll,
                    Pattern::new(vec![down, right, up]),
                ),
                Gesture::new("reload", Action::Reload, Pattern::new(vec![left, up])),
            ]
            .into(),
        }
    }

    /// Non-fatal problems: entries that load but can never match.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        for g in self.iter() {
            if g.pattern.is_empty() {
                problems.push(format!("gesture {:?} has an empty pattern", g.id));
            } else if !g.pattern.is_well_formed() {
                problems.push(format!(
                    "gesture {:?} has a zero-length or non-finite vector",
                    g.id
                ));
            }
        }
        problems
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Gesture> {
        self.gestures.iter().find(|g| g.id == id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.gestures.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gestures.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Gesture> {
        self.gestures.iter()
    }

    /// Enabled gestures, in registration order.
    pub fn enabled(&self) -> impl Iterator<Item = &Gesture> {
        self.gestures.iter().filter(|g| g.enabled)
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Gesture] {
        &self.gestures
    }
}

impl<'a> IntoIterator for &'a GestureRegistry {
    type Item = &'a Gesture;
    type IntoIter = std::slice::Iter<'a, Gesture>;

    fn into_iter(self) -> Self::IntoIter {
        self.gestures.iter()
    }
}
