#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading registries and configuration.
///
/// Recognition itself never fails: "no match" and ignored samples are
/// ordinary return values.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("host reported an error: {message}")]
    Host { message: String },

    #[error("duplicate gesture id: {id}")]
    DuplicateId { id: String },

    #[error("gesture {id} has invalid finger count {fingers} (must be >= 1)")]
    InvalidFingers { id: String, fingers: u8 },

    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Read a file, attaching its path to any I/O error.
pub(crate) fn read_to_string(path: &std::path::Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| Error::io(path, e))
}
