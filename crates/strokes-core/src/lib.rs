#![forbid(unsafe_code)]

//! Core: directional stroke recognition.
//!
//! # Role in strokes
//! `strokes-core` turns a live stream of pointer coordinates into a compact
//! sequence of direction segments and matches it against configured
//! gestures. Hosts own event dispatch, persistence, and action execution;
//! this crate only consumes points and a gesture list, and reports matches.
//!
//! # Primary responsibilities
//! - **PatternConstructor**: O(1)-per-sample reduction of points to a
//!   [`Pattern`].
//! - **Matcher**: scoring a pattern against a [`GestureRegistry`].
//! - **CaptureSession**: single-pointer gating, live feedback, and release
//!   resolution.
//! - **Wire types**: serde forms of gestures, actions, and host responses.
//!
//! # Example
//! ```
//! use strokes_core::{GestureRegistry, PatternConstructor, Point, matcher};
//!
//! let registry = GestureRegistry::demo();
//! let mut pc = PatternConstructor::default();
//! for (x, y) in [(0.0, 0.0), (0.0, 200.0), (200.0, 200.0)] {
//!     pc.add_point(Point::new(x, y));
//! }
//! let hit = matcher::closest_gesture_by_pattern(pc.pattern(), registry.iter(), 0.12);
//! assert_eq!(hit.map(|g| g.id.as_str()), Some("close"));
//! ```

pub mod config;
pub mod error;
pub mod exclusion;
pub mod geometry;
pub mod gesture;
pub mod matcher;
pub mod pattern;
pub mod registry;
pub mod sensitivity;
pub mod session;

pub use config::RecognizerConfig;
pub use error::{Error, Result};
pub use geometry::{Point, Vector};
pub use gesture::{Action, Gesture};
pub use matcher::{Match, MatcherConfig};
pub use pattern::{ConstructorConfig, Pattern, PatternConstructor};
pub use registry::GestureRegistry;
pub use sensitivity::Sensitivity;
pub use session::{CaptureSession, PointerEvent, SessionEvent, SessionState};
