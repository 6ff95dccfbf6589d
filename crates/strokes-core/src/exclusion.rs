#![forbid(unsafe_code)]

//! Pages on which stroke recognition is switched off.
//!
//! An entry excludes a whole domain, or a single path on it when `path` is
//! set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionEntry {
    pub id: String,
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ExclusionEntry {
    /// Domain must be equal; an unset path covers every path.
    #[must_use]
    pub fn matches(&self, domain: &str, path: Option<&str>) -> bool {
        self.domain == domain
            && match &self.path {
                None => true,
                Some(own) => path == Some(own.as_str()),
            }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExclusionList {
    entries: Vec<ExclusionEntry>,
}

impl ExclusionList {
    #[must_use]
    pub fn new(entries: Vec<ExclusionEntry>) -> Self {
        Self { entries }
    }

    /// First entry covering `domain` / `path`.
    #[must_use]
    pub fn find(&self, domain: &str, path: Option<&str>) -> Option<&ExclusionEntry> {
        self.entries.iter().find(|e| e.matches(domain, path))
    }

    #[must_use]
    pub fn is_excluded(&self, domain: &str, path: Option<&str>) -> bool {
        self.find(domain, path).is_some()
    }

    pub fn add(&mut self, entry: ExclusionEntry) {
        self.entries.push(entry);
    }

    /// Remove by id, returning the removed entry.
    pub fn remove(&mut self, id: &str) -> Option<ExclusionEntry> {
        let idx = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(idx))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
