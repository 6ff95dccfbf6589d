#![forbid(unsafe_code)]

//! Gesture definitions and the actions they trigger.
//!
//! The wire encoding of [`Action`] is an object with exactly one field set,
//! e.g. `{"tab_close": true}` or `{"javascript_run": {"code": "..."}}`. That
//! shape is translated at the serde boundary; in Rust an action is a plain
//! enum.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::pattern::Pattern;

// ---------------------------------------------------------------------------
// Action
// ---------------------------------------------------------------------------

/// What to do when a gesture is recognized. Opaque to the recognizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ActionWire", into = "ActionWire")]
pub enum Action {
    JavascriptRun {
        code: String,
        description: Option<String>,
    },
    Reload,
    ScrollBottom,
    ScrollTop,
    TabClose,
    TabCloseAll,
    TabDuplicate,
    TabNext,
    TabOpen,
    TabPrevious,
    UrlCopy,
}

impl Action {
    /// The wire key naming this action.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::JavascriptRun { .. } => "javascript_run",
            Self::Reload => "reload",
            Self::ScrollBottom => "scroll_bottom",
            Self::ScrollTop => "scroll_top",
            Self::TabClose => "tab_close",
            Self::TabCloseAll => "tab_close_all",
            Self::TabDuplicate => "tab_duplicate",
            Self::TabNext => "tab_next",
            Self::TabOpen => "tab_open",
            Self::TabPrevious => "tab_previous",
            Self::UrlCopy => "url_copy",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JavascriptRun {
                description: Some(d),
                ..
            } => write!(f, "javascript_run ({d})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Script payload of [`Action::JavascriptRun`] on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct JavascriptRun {
    code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

/// One-field-set object form of [`Action`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ActionWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    javascript_run: Option<JavascriptRun>,
    #[serde(default, skip_serializing_if = "is_unset")]
    reload: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    scroll_bottom: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    scroll_top: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    tab_close: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    tab_close_all: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    tab_duplicate: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    tab_next: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    tab_open: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    tab_previous: Option<bool>,
    #[serde(default, skip_serializing_if = "is_unset")]
    url_copy: Option<bool>,
}

fn is_unset(flag: &Option<bool>) -> bool {
    !flag.unwrap_or(false)
}

impl TryFrom<ActionWire> for Action {
    type Error = String;

    fn try_from(wire: ActionWire) -> Result<Self, Self::Error> {
        let flags = [
            (wire.reload, Action::Reload),
            (wire.scroll_bottom, Action::ScrollBottom),
            (wire.scroll_top, Action::ScrollTop),
            (wire.tab_close, Action::TabClose),
            (wire.tab_close_all, Action::TabCloseAll),
            (wire.tab_duplicate, Action::TabDuplicate),
            (wire.tab_next, Action::TabNext),
            (wire.tab_open, Action::TabOpen),
            (wire.tab_previous, Action::TabPrevious),
            (wire.url_copy, Action::UrlCopy),
        ];

        let mut set: Vec<Action> = flags
            .into_iter()
            .filter(|(flag, _)| flag.unwrap_or(false))
            .map(|(_, action)| action)
            .collect();
        if let Some(js) = wire.javascript_run {
            set.push(Action::JavascriptRun {
                code: js.code,
                description: js.description,
            });
        }

        match set.len() {
            1 => Ok(set.remove(0)),
            0 => Err("action has no field set".to_string()),
            _ => Err(format!(
                "action has {} fields set, expected exactly one: {}",
                set.len(),
                set.iter().map(Action::name).collect::<Vec<_>>().join(", ")
            )),
        }
    }
}

impl From<Action> for ActionWire {
    fn from(action: Action) -> Self {
        let mut wire = ActionWire::default();
        let flag = Some(true);
        match action {
            Action::JavascriptRun { code, description } => {
                wire.javascript_run = Some(JavascriptRun { code, description });
            }
            Action::Reload => wire.reload = flag,
            Action::ScrollBottom => wire.scroll_bottom = flag,
            Action::ScrollTop => wire.scroll_top = flag,
            Action::TabClose => wire.tab_close = flag,
            Action::TabCloseAll => wire.tab_close_all = flag,
            Action::TabDuplicate => wire.tab_duplicate = flag,
            Action::TabNext => wire.tab_next = flag,
            Action::TabOpen => wire.tab_open = flag,
            Action::TabPrevious => wire.tab_previous = flag,
            Action::UrlCopy => wire.url_copy = flag,
        }
        wire
    }
}

// ---------------------------------------------------------------------------
// Gesture
// ---------------------------------------------------------------------------

/// A registered stroke template and the action it triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gesture {
    pub action: Action,
    pub enabled: bool,
    /// Number of fingers needed to perform the gesture.
    pub fingers: u8,
    pub id: String,
    pub pattern: Pattern,
}

impl Gesture {
    /// An enabled single-finger gesture.
    #[must_use]
    pub fn new(id: impl Into<String>, action: Action, pattern: Pattern) -> Self {
        Self {
            action,
            enabled: true,
            fingers: 1,
            id: id.into(),
            pattern,
        }
    }

    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    #[must_use]
    pub fn with_fingers(mut self, fingers: u8) -> Self {
        self.fingers = fingers;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vector;

    #[test]
    fn unit_action_round_trips_as_flag_object() {
        let json = serde_json::to_string(&Action::TabCloseAll).unwrap();
        assert_eq!(json, r#"{"tab_close_all":true}"#);
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Action::TabCloseAll);
    }

    #[test]
    fn javascript_run_decodes_description() {
        let a: Action = serde_json::from_str(
            r#"{"javascript_run":{"code":"history.back()","description":"back"}}"#,
        )
        .unwrap();
        assert_eq!(
            a,
            Action::JavascriptRun {
                code: "history.back()".into(),
                description: Some("back".into()),
            }
        );
        assert_eq!(a.to_string(), "javascript_run (back)");
    }

    #[test]
    fn false_flags_are_unset() {
        let a: Action = serde_json::from_str(r#"{"reload":false,"url_copy":true}"#).unwrap();
        assert_eq!(a, Action::UrlCopy);
    }

    #[test]
    fn empty_action_is_rejected() {
        let err = serde_json::from_str::<Action>("{}").unwrap_err();
        assert!(err.to_string().contains("no field set"), "{err}");
    }

    #[test]
    fn multiple_fields_are_rejected() {
        let err = serde_json::from_str::<Action>(
            r#"{"reload":true,"javascript_run":{"code":"x"}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("expected exactly one"), "{err}");
    }

    #[test]
    fn unknown_action_key_is_rejected() {
        assert!(serde_json::from_str::<Action>(r#"{"fly":true}"#).is_err());
    }

    #[test]
    fn gesture_wire_format() {
        let json = r#"{
            "action": {"tab_close": true},
            "enabled": true,
            "fingers": 1,
            "id": "close",
            "pattern": {"data": [{"x": 0, "y": 240}, {"x": 240, "y": 0}]}
        }"#;
        let g: Gesture = serde_json::from_str(json).unwrap();
        assert_eq!(g.id, "close");
        assert_eq!(g.action, Action::TabClose);
        assert_eq!(g.fingers, 1);
        assert_eq!(g.pattern.as_slice()[1], Vector::new(240.0, 0.0));
    }

    #[test]
    fn builder_helpers() {
        let g = Gesture::new("g", Action::Reload, Pattern::default())
            .with_enabled(false)
            .with_fingers(2);
        assert!(!g.enabled);
        assert_eq!(g.fingers, 2);
    }
}
