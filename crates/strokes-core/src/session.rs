#![forbid(unsafe_code)]

//! Capture sessions: gating pointer input and resolving strokes to gestures.
//!
//! [`CaptureSession`] owns one [`PatternConstructor`] and feeds it the
//! samples of a single active pointer. It emits live feedback while the
//! stroke grows and a final result when the pointer is released.
//!
//! # State Machine
//!
//! ```text
//!            qualifying move             release
//!   Idle ───────────────────▶ Constructing ───────▶ Idle   (Release)
//!                                  │
//!                second touch /    │
//!                Cancel            ▼        release
//!                              Abandoned ──────────▶ Idle   (nothing)
//! ```
//!
//! - A touch move qualifies when exactly one finger is down. A mouse move
//!   qualifies when mouse recognition is enabled and only the primary
//!   button is held. Moves from the other source are ignored mid-stroke,
//!   but either release event (`TouchEnd` or `MouseUp`) ends the stroke.
//! - While constructing, every sample after which the pattern has two or
//!   more segments yields [`SessionEvent::Change`].
//! - A second finger or an explicit [`PointerEvent::Cancel`] abandons the
//!   session: the pattern is cleared, [`SessionEvent::Cancelled`] is emitted
//!   once, and all further input is swallowed until the next release.
//!   A cancelled mouse stroke skips `Abandoned` and goes straight to `Idle`.
//!
//! # Invariants
//!
//! 1. The registry and thresholds used by a session are fixed when it
//!    starts. [`set_registry`](CaptureSession::set_registry) and
//!    [`set_config`](CaptureSession::set_config) during a session apply to
//!    the next one.
//! 2. An abandoned session never produces `Change` or `Release`.
//! 3. The constructor is empty whenever the state is not `Constructing`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::RecognizerConfig;
use crate::geometry::Point;
use crate::gesture::Gesture;
use crate::matcher::{self, Match, MatcherConfig};
use crate::pattern::{Pattern, PatternConstructor};
use crate::registry::GestureRegistry;

/// `buttons` bitmask value for "primary button only".
pub const PRIMARY_BUTTON: u16 = 1;

// ---------------------------------------------------------------------------
// Input / output
// ---------------------------------------------------------------------------

/// Pointer input, already translated from the host's event system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    /// Positions of all fingers currently on the surface.
    TouchMove { touches: Vec<Point> },
    TouchEnd,
    /// Pointer position and the bitmask of held buttons.
    MouseMove { point: Point, buttons: u16 },
    MouseUp,
    /// Abandon the current stroke (e.g. focus loss).
    ///
    /// A touch stroke then waits for its release. A mouse stroke returns to
    /// idle at once, since the matching `MouseUp` may never be delivered.
    Cancel,
}

/// What produced the current stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Touch,
    Mouse,
}

impl InputSource {
    /// Finger count to match against; mouse strokes have none.
    #[must_use]
    pub const fn fingers(self) -> Option<u8> {
        match self {
            Self::Touch => Some(1),
            Self::Mouse => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Constructing,
    Abandoned,
}

/// Output of [`CaptureSession::handle`].
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Live feedback: best match for the stroke so far.
    Change(Option<Gesture>),
    /// Final result for a completed stroke.
    Release {
        gesture: Option<Gesture>,
        segments: usize,
        duration: Duration,
    },
    /// The stroke was abandoned; no result will follow.
    Cancelled,
}

// ---------------------------------------------------------------------------
// CaptureSession
// ---------------------------------------------------------------------------

/// Single-pointer capture controller.
///
/// Call [`handle`](CaptureSession::handle) for each pointer event in
/// delivery order.
pub struct CaptureSession {
    registry: GestureRegistry,
    config: RecognizerConfig,
    matcher: MatcherConfig,
    constructor: PatternConstructor,

    // Applied at the next session start.
    pending_registry: Option<GestureRegistry>,
    pending_config: Option<RecognizerConfig>,

    state: SessionState,
    source: Option<InputSource>,
    started: Option<Instant>,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("source", &self.source)
            .field("segments", &self.constructor.len())
            .field("gestures", &self.registry.len())
            .finish()
    }
}

impl CaptureSession {
    #[must_use]
    pub fn new(registry: GestureRegistry, config: RecognizerConfig) -> Self {
        Self {
            registry,
            matcher: config.matcher_config(),
            constructor: PatternConstructor::new(config.constructor_config()),
            config,
            pending_registry: None,
            pending_config: None,
            state: SessionState::Idle,
            source: None,
            started: None,
        }
    }

    /// Process one pointer event, returning the resulting notification, if
    /// any.
    pub fn handle(&mut self, event: &PointerEvent, now: Instant) -> Option<SessionEvent> {
        match event {
            PointerEvent::TouchMove { touches } => match touches.as_slice() {
                [] => None,
                [p] => self.on_move(InputSource::Touch, *p, now),
                _ => self.abandon(),
            },
            PointerEvent::MouseMove { point, buttons } => {
                if !self.mouse_enabled() || *buttons != PRIMARY_BUTTON {
                    return None;
                }
                self.on_move(InputSource::Mouse, *point, now)
            }
            PointerEvent::TouchEnd | PointerEvent::MouseUp => self.on_release(now),
            PointerEvent::Cancel => self.abandon(),
        }
    }

    /// Best match for the stroke so far, with its distance.
    #[must_use]
    pub fn closest(&self) -> Option<Match<'_>> {
        let fingers = self.source.and_then(InputSource::fingers);
        matcher::closest_gesture(
            self.constructor.pattern(),
            self.registry.iter(),
            fingers,
            &self.matcher,
        )
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn source(&self) -> Option<InputSource> {
        self.source
    }

    /// Pattern of the stroke in progress (empty outside a session).
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &Pattern {
        self.constructor.pattern()
    }

    /// Registry used by the current (or next, when idle) session.
    #[inline]
    #[must_use]
    pub fn registry(&self) -> &GestureRegistry {
        &self.registry
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Replace the registry. Deferred to the next session if one is running.
    pub fn set_registry(&mut self, registry: GestureRegistry) {
        self.pending_registry = Some(registry);
        if self.state == SessionState::Idle {
            self.apply_pending();
        }
    }

    /// Replace the configuration. Deferred to the next session if one is
    /// running.
    pub fn set_config(&mut self, config: RecognizerConfig) {
        self.pending_config = Some(config);
        if self.state == SessionState::Idle {
            self.apply_pending();
        }
    }

    /// Drop any stroke in progress without emitting anything.
    pub fn reset(&mut self) {
        self.constructor.clear();
        self.state = SessionState::Idle;
        self.source = None;
        self.started = None;
        self.apply_pending();
    }
}

// ---------------------------------------------------------------------------
// Internal handlers
// ---------------------------------------------------------------------------

impl CaptureSession {
    fn mouse_enabled(&self) -> bool {
        match (self.state, &self.pending_config) {
            (SessionState::Idle, Some(pending)) => pending.mouse_enabled,
            _ => self.config.mouse_enabled,
        }
    }

    fn on_move(&mut self, source: InputSource, p: Point, now: Instant) -> Option<SessionEvent> {
        match self.state {
            SessionState::Abandoned => return None,
            SessionState::Idle => self.begin(source, now),
            SessionState::Constructing => {
                if self.source != Some(source) {
                    return None;
                }
            }
        }

        if self.constructor.add_point(p) >= 2 {
            let gesture = self.closest().map(|m| m.gesture.clone());
            return Some(SessionEvent::Change(gesture));
        }
        None
    }

    fn on_release(&mut self, now: Instant) -> Option<SessionEvent> {
        match self.state {
            SessionState::Idle => None,
            SessionState::Abandoned => {
                self.reset();
                None
            }
            SessionState::Constructing => {
                let gesture = self.closest().map(|m| m.gesture.clone());
                let segments = self.constructor.len();
                let duration = self
                    .started
                    .map(|t| now.saturating_duration_since(t))
                    .unwrap_or_default();

                #[cfg(feature = "tracing")]
                tracing::debug!(
                    segments,
                    duration_ms = duration.as_millis() as u64,
                    gesture = gesture.as_ref().map(|g| g.id.as_str()),
                    "stroke released"
                );

                self.reset();
                Some(SessionEvent::Release {
                    gesture,
                    segments,
                    duration,
                })
            }
        }
    }

    fn begin(&mut self, source: InputSource, now: Instant) {
        self.apply_pending();
        self.state = SessionState::Constructing;
        self.source = Some(source);
        self.started = Some(now);

        #[cfg(feature = "tracing")]
        tracing::debug!(?source, gestures = self.registry.len(), "stroke started");
    }

    fn abandon(&mut self) -> Option<SessionEvent> {
        if self.state != SessionState::Constructing {
            return None;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(source = ?self.source, "stroke abandoned");

        if self.source == Some(InputSource::Mouse) {
            self.reset();
        } else {
            self.constructor.clear();
            self.state = SessionState::Abandoned;
        }
        Some(SessionEvent::Cancelled)
    }

    fn apply_pending(&mut self) {
        if let Some(registry) = self.pending_registry.take() {
            self.registry = registry;
        }
        if let Some(config) = self.pending_config.take() {
            if config.constructor_config() != *self.constructor.config() {
                self.constructor = PatternConstructor::new(config.constructor_config());
            }
            self.matcher = config.matcher_config();
            self.config = config;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;
    use crate::gesture::Action;
    use crate::sensitivity::Sensitivity;

    fn now() -> Instant {
        Instant::now()
    }

    fn touch(x: f64, y: f64) -> PointerEvent {
        PointerEvent::TouchMove {
            touches: vec![Point::new(x, y)],
        }
    }

    fn two_touches() -> PointerEvent {
        PointerEvent::TouchMove {
            touches: vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0)],
        }
    }

    fn mouse(x: f64, y: f64, buttons: u16) -> PointerEvent {
        PointerEvent::MouseMove {
            point: Point::new(x, y),
            buttons,
        }
    }

    fn session() -> CaptureSession {
        CaptureSession::new(GestureRegistry::demo(), RecognizerConfig::default())
    }

    /// Down 200px then right 200px: the demo "close" gesture.
    fn draw_close(s: &mut CaptureSession, t: Instant) -> Vec<SessionEvent> {
        [(0.0, 0.0), (0.0, 100.0), (0.0, 200.0), (100.0, 200.0), (200.0, 200.0)]
            .iter()
            .filter_map(|&(x, y)| s.handle(&touch(x, y), t))
            .collect()
    }

    const MS_300: Duration = Duration::from_millis(300);

    // --- Touch ---

    #[test]
    fn touch_stroke_releases_with_match() {
        let mut s = session();
        let t = now();
        let events = draw_close(&mut s, t);
        assert_eq!(s.state(), SessionState::Constructing);
        // Change fires for each sample once two segments exist.
        assert_eq!(events.len(), 2);
        for e in &events {
            let SessionEvent::Change(Some(g)) = e else {
                panic!("expected live match, got {e:?}");
            };
            assert_eq!(g.id, "close");
        }

        let released = s.handle(&PointerEvent::TouchEnd, t + MS_300).unwrap();
        let SessionEvent::Release {
            gesture,
            segments,
            duration,
        } = released
        else {
            panic!("expected release");
        };
        assert_eq!(gesture.unwrap().action, Action::TabClose);
        assert_eq!(segments, 2);
        assert_eq!(duration, MS_300);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.pattern().is_empty());
    }

    #[test]
    fn release_without_movement_is_no_match() {
        let mut s = session();
        let t = now();
        assert!(s.handle(&touch(10.0, 10.0), t).is_none());
        assert_eq!(
            s.handle(&PointerEvent::TouchEnd, t),
            Some(SessionEvent::Release {
                gesture: None,
                segments: 0,
                duration: Duration::ZERO,
            })
        );
    }

    #[test]
    fn release_while_idle_emits_nothing() {
        let mut s = session();
        assert!(s.handle(&PointerEvent::TouchEnd, now()).is_none());
        assert!(s.handle(&PointerEvent::MouseUp, now()).is_none());
    }

    #[test]
    fn unknown_shape_releases_none() {
        let mut s = session();
        let t = now();
        for &(x, y) in &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            s.handle(&touch(x, y), t);
        }
        let Some(SessionEvent::Release { gesture, segments, .. }) =
            s.handle(&PointerEvent::TouchEnd, t)
        else {
            panic!("expected release");
        };
        assert_eq!(segments, 2);
        assert!(gesture.is_none());
    }

    // --- Abandonment ---

    #[test]
    fn second_finger_abandons_and_suppresses_release() {
        let mut s = session();
        let t = now();
        s.handle(&touch(0.0, 0.0), t);
        s.handle(&touch(0.0, 100.0), t);
        assert_eq!(s.handle(&two_touches(), t), Some(SessionEvent::Cancelled));
        assert_eq!(s.state(), SessionState::Abandoned);
        assert!(s.pattern().is_empty());

        // Further input is swallowed until release.
        assert!(s.handle(&touch(100.0, 100.0), t).is_none());
        assert!(s.handle(&two_touches(), t).is_none());
        assert!(s.handle(&PointerEvent::TouchEnd, t).is_none());
        assert_eq!(s.state(), SessionState::Idle);

        // Next session starts fresh.
        let events = draw_close(&mut s, t);
        assert!(matches!(events.last(), Some(SessionEvent::Change(Some(_)))));
    }

    #[test]
    fn multi_touch_while_idle_is_ignored() {
        let mut s = session();
        assert!(s.handle(&two_touches(), now()).is_none());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn explicit_cancel() {
        let mut s = session();
        let t = now();
        assert!(s.handle(&PointerEvent::Cancel, t).is_none());
        s.handle(&touch(0.0, 0.0), t);
        assert_eq!(s.handle(&PointerEvent::Cancel, t), Some(SessionEvent::Cancelled));
        assert!(s.handle(&PointerEvent::Cancel, t).is_none());
    }

    #[test]
    fn reset_drops_stroke_silently() {
        let mut s = session();
        let t = now();
        draw_close(&mut s, t);
        s.reset();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.handle(&PointerEvent::TouchEnd, t).is_none());
    }

    // --- Mouse ---

    #[test]
    fn mouse_requires_primary_button() {
        let mut s = session();
        let t = now();
        assert!(s.handle(&mouse(0.0, 0.0, 0), t).is_none());
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.handle(&mouse(0.0, 0.0, 2), t).is_none());
        assert!(s.handle(&mouse(0.0, 0.0, 3), t).is_none());
        assert_eq!(s.state(), SessionState::Idle);

        s.handle(&mouse(0.0, 0.0, PRIMARY_BUTTON), t);
        assert_eq!(s.state(), SessionState::Constructing);
        assert_eq!(s.source(), Some(InputSource::Mouse));
    }

    #[test]
    fn mouse_cancel_returns_to_idle_without_release() {
        let mut s = session();
        let t = now();
        s.handle(&mouse(0.0, 0.0, PRIMARY_BUTTON), t);
        s.handle(&mouse(0.0, 200.0, PRIMARY_BUTTON), t);
        assert_eq!(s.handle(&PointerEvent::Cancel, t), Some(SessionEvent::Cancelled));
        assert_eq!(s.state(), SessionState::Idle);

        // The lost MouseUp never arrives; the next drag is still recognized.
        for (x, y) in [(0.0, 0.0), (0.0, 200.0), (200.0, 200.0)] {
            s.handle(&mouse(x, y, PRIMARY_BUTTON), t + MS_300);
        }
        let Some(SessionEvent::Release { gesture, .. }) = s.handle(&PointerEvent::MouseUp, t + MS_300)
        else {
            panic!("expected a release");
        };
        assert_eq!(gesture.unwrap().id, "close");
    }

    #[test]
    fn touch_cancel_waits_for_release() {
        let mut s = session();
        let t = now();
        s.handle(&touch(0.0, 0.0), t);
        assert_eq!(s.handle(&PointerEvent::Cancel, t), Some(SessionEvent::Cancelled));
        assert_eq!(s.state(), SessionState::Abandoned);
        assert!(s.handle(&touch(0.0, 200.0), t).is_none());
        assert!(s.handle(&PointerEvent::TouchEnd, t).is_none());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn mouse_stroke_matches_without_finger_filter() {
        let two_finger = GestureRegistry::from_gestures(vec![
            Gesture::new(
                "swipe",
                Action::TabNext,
                Pattern::new(vec![Vector::RIGHT, Vector::DOWN]),
            )
            .with_fingers(2),
        ])
        .unwrap();
        let mut s = CaptureSession::new(two_finger, RecognizerConfig::default());
        let t = now();
        for &(x, y) in &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            s.handle(&mouse(x, y, PRIMARY_BUTTON), t);
        }
        let Some(SessionEvent::Release { gesture, .. }) = s.handle(&PointerEvent::MouseUp, t)
        else {
            panic!("expected release");
        };
        assert_eq!(gesture.unwrap().id, "swipe");

        // The same stroke by touch needs a one-finger gesture.
        for &(x, y) in &[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0)] {
            s.handle(&touch(x, y), t);
        }
        let Some(SessionEvent::Release { gesture, .. }) = s.handle(&PointerEvent::TouchEnd, t)
        else {
            panic!("expected release");
        };
        assert!(gesture.is_none());
    }

    #[test]
    fn mouse_disabled_ignores_drags() {
        let config = RecognizerConfig {
            mouse_enabled: false,
            ..RecognizerConfig::default()
        };
        let mut s = CaptureSession::new(GestureRegistry::demo(), config);
        assert!(s.handle(&mouse(0.0, 0.0, PRIMARY_BUTTON), now()).is_none());
        assert_eq!(s.state(), SessionState::Idle);
    }

    #[test]
    fn other_source_ignored_mid_stroke() {
        let mut s = session();
        let t = now();
        s.handle(&touch(0.0, 0.0), t);
        assert!(s.handle(&mouse(0.0, 500.0, PRIMARY_BUTTON), t).is_none());
        assert_eq!(s.pattern().len(), 0);
    }

    // --- Snapshot semantics ---

    #[test]
    fn registry_update_waits_for_next_session() {
        let mut s = session();
        let t = now();
        s.handle(&touch(0.0, 0.0), t);
        s.set_registry(GestureRegistry::empty());
        assert_eq!(s.registry().len(), 3);

        for &(x, y) in &[(0.0, 200.0), (200.0, 200.0)] {
            s.handle(&touch(x, y), t);
        }
        let Some(SessionEvent::Release { gesture, .. }) = s.handle(&PointerEvent::TouchEnd, t)
        else {
            panic!("expected release");
        };
        assert_eq!(gesture.unwrap().id, "close");
        assert!(s.registry().is_empty());
    }

    #[test]
    fn config_update_waits_for_next_session() {
        let mut s = session();
        let t = now();
        s.handle(&touch(0.0, 0.0), t);
        s.set_config(RecognizerConfig {
            sensitivity: Sensitivity::new(3.0),
            ..RecognizerConfig::default()
        });
        // 40px is below the active 60px threshold.
        s.handle(&touch(40.0, 0.0), t);
        assert_eq!(s.pattern().len(), 0);
        s.handle(&PointerEvent::TouchEnd, t);

        // The new 36px threshold applies now.
        s.handle(&touch(0.0, 0.0), t);
        s.handle(&touch(40.0, 0.0), t);
        assert_eq!(s.pattern().len(), 1);
        assert_eq!(s.config().sensitivity.value(), 3.0);
    }

    #[test]
    fn idle_updates_apply_immediately() {
        let mut s = session();
        s.set_registry(GestureRegistry::empty());
        assert!(s.registry().is_empty());
        s.set_config(RecognizerConfig {
            mouse_enabled: false,
            ..RecognizerConfig::default()
        });
        assert!(!s.config().mouse_enabled);
    }

    #[test]
    fn pointer_event_wire_format() {
        let e: PointerEvent =
            serde_json::from_str(r#"{"type":"mouse_move","point":{"x":1,"y":2},"buttons":1}"#)
                .unwrap();
        assert_eq!(e, mouse(1.0, 2.0, 1));
        let e: PointerEvent = serde_json::from_str(r#"{"type":"touch_end"}"#).unwrap();
        assert_eq!(e, PointerEvent::TouchEnd);
    }

    #[test]
    fn debug_is_compact() {
        let s = session();
        let dbg = format!("{s:?}");
        assert!(dbg.contains("Idle"));
        assert!(dbg.contains("gestures: 3"));
    }
}
