#![forbid(unsafe_code)]

//! Recognizer configuration loaded from TOML or JSON.
//!
//! ```toml
//! # strokes.toml
//! sensitivity = 1.5
//! acceptance_threshold = 0.12
//! length_penalty = 0.15
//! mouse_enabled = true
//! ```
//!
//! Every field is optional; missing fields take the defaults below, which
//! reproduce the stock recognizer behavior.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{self, Error, Result};
use crate::matcher::MatcherConfig;
use crate::pattern::ConstructorConfig;
use crate::sensitivity::Sensitivity;

/// All knobs a capture session reads at session start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Movement sensitivity in `[-3, 3]` (default: 0).
    pub sensitivity: Sensitivity,
    /// Matcher acceptance threshold (default: 0.12).
    pub acceptance_threshold: f64,
    /// Matcher penalty per segment of length difference (default: 0.15).
    pub length_penalty: f64,
    /// Whether primary-button mouse drags are recognized (default: true).
    pub mouse_enabled: bool,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::default(),
            acceptance_threshold: MatcherConfig::DEFAULT_ACCEPTANCE_THRESHOLD,
            length_penalty: MatcherConfig::DEFAULT_LENGTH_PENALTY,
            mouse_enabled: true,
        }
    }
}

impl RecognizerConfig {
    /// Load from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&error::read_to_string(path.as_ref())?)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json_str(&error::read_to_string(path.as_ref())?)
    }

    /// Load by extension (`.json`, anything else is read as TOML) and
    /// validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_file(path)?,
            _ => Self::from_toml_file(path)?,
        };
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(Error::Validation(errors));
        }
        Ok(config)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.acceptance_threshold.is_finite() || self.acceptance_threshold <= 0.0 {
            errors.push(format!(
                "acceptance_threshold must be > 0, got {}",
                self.acceptance_threshold
            ));
        }
        if !self.length_penalty.is_finite() || self.length_penalty < 0.0 {
            errors.push(format!(
                "length_penalty must be >= 0, got {}",
                self.length_penalty
            ));
        }

        errors
    }

    #[must_use]
    pub fn constructor_config(&self) -> ConstructorConfig {
        self.sensitivity.constructor_config()
    }

    #[must_use]
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            acceptance_threshold: self.acceptance_threshold,
            length_penalty: self.length_penalty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let c = RecognizerConfig::default();
        assert!(c.validate().is_empty());
        assert_eq!(c.constructor_config(), ConstructorConfig::default());
        assert_eq!(c.matcher_config(), MatcherConfig::default());
    }

    #[test]
    fn toml_partial_uses_defaults() {
        let c = RecognizerConfig::from_toml_str("sensitivity = 3.0\nmouse_enabled = false\n").unwrap();
        assert_eq!(c.sensitivity.value(), 3.0);
        assert!(!c.mouse_enabled);
        assert_eq!(c.acceptance_threshold, 0.12);
        assert!((c.constructor_config().distance_threshold - 36.0).abs() < 1e-9);
    }

    #[test]
    fn json_round_trip() {
        let c = RecognizerConfig {
            sensitivity: Sensitivity::new(-2.0),
            acceptance_threshold: 0.3,
            ..RecognizerConfig::default()
        };
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(RecognizerConfig::from_json_str(&json).unwrap(), c);
    }

    #[test]
    fn validate_catches_bad_thresholds() {
        let c = RecognizerConfig {
            acceptance_threshold: 0.0,
            length_penalty: -1.0,
            ..RecognizerConfig::default()
        };
        let errors = c.validate();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("acceptance_threshold"));
        assert!(errors[1].contains("length_penalty"));
    }

    #[test]
    fn load_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("strokes.json");
        std::fs::write(&json, r#"{"sensitivity": -1}"#).unwrap();
        assert_eq!(RecognizerConfig::load(&json).unwrap().sensitivity.value(), -1.0);

        let toml = dir.path().join("strokes.toml");
        std::fs::write(&toml, "length_penalty = 0.5").unwrap();
        assert_eq!(RecognizerConfig::load(&toml).unwrap().length_penalty, 0.5);
    }

    #[test]
    fn load_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "acceptance_threshold = -1.0").unwrap();
        assert!(matches!(
            RecognizerConfig::load(&path),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            RecognizerConfig::load("/nonexistent/strokes.toml"),
            Err(Error::Io { .. })
        ));
    }
}
